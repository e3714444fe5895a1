//! Behaviour every store backend must share.

use assert_matches::assert_matches;
use bytes::Bytes;

use super::{FileStore, FlagStore, MAX_FILE_NAME, RecordId, StoreErr};
use crate::{FlagErr, MultiFlag, testutil::mkflag};

pub fn check_flags(store: &mut impl FlagStore) {
    for flag in [
        MultiFlag::new(50).unwrap(),
        MultiFlag::with_value(50, false).unwrap(),
        mkflag(50, true, [10]),
    ] {
        let view = flag.view().unwrap();
        let value = flag.get_flag().unwrap();
        let id = store.add_flag(&view, value).unwrap();

        let record = store.get_flag(id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.view, view);
        assert_eq!(record.value, value);
        assert_eq!(store.find_flag(&view).unwrap(), Some(id));
    }

    let id = store.add_flag("FF", false).unwrap();
    assert!(store.delete_flag(id).unwrap());
    assert_eq!(store.get_flag(id).unwrap(), None);
    assert_eq!(store.find_flag("FF").unwrap(), None);
    assert!(!store.delete_flag(id).unwrap());
    assert!(!store.delete_flag(RecordId::from(999)).unwrap());
}

pub fn check_flag_ids(store: &mut impl FlagStore) {
    let a = store.add_flag("TT", true).unwrap();
    let b = store.add_flag("TT", true).unwrap();
    assert_eq!(a, RecordId::FIRST);
    assert!(b > a);
    // duplicates are allowed, find returns the oldest
    assert_eq!(store.find_flag("TT").unwrap(), Some(a));

    // deleted ids are never reused
    assert!(store.delete_flag(b).unwrap());
    let c = store.add_flag("TF", false).unwrap();
    assert!(c > b);
}

pub fn check_add_flag_invalid(store: &mut impl FlagStore) {
    assert_matches!(store.add_flag("TTFT", true), Err(StoreErr::Inconsistent { value: true }));
    assert_matches!(store.add_flag("TTTT", false), Err(StoreErr::Inconsistent { .. }));
    assert_matches!(
        store.add_flag("TxT", false),
        Err(StoreErr::View(FlagErr::InvalidView { position: 1, found: 'x' }))
    );
}

pub fn check_save_load(store: &mut impl FlagStore) {
    let mut flag = mkflag(100, true, [0, 99]);
    let id = store.save(&flag).unwrap();

    let loaded = store.load(id).unwrap().unwrap();
    assert_eq!(loaded, flag);
    assert_eq!(loaded.get_flag(), Some(false));
    assert_matches!(store.load(RecordId::from(42)), Ok(None));

    flag.dispose();
    assert_matches!(store.save(&flag), Err(StoreErr::Disposed));
}

/// Leaves exactly three files in `store`.
pub fn check_files(store: &mut impl FileStore) {
    let name = "TestGetFiles_MultipleFiles";
    let first = store.add_file(name, Bytes::from_static(b"first")).unwrap();
    store.add_file("other", Bytes::from_static(b"other")).unwrap();
    let second = store.add_file(name, Bytes::from_static(b"second")).unwrap();
    assert!(first < second);

    let record = store.get_file(first).unwrap().unwrap();
    assert_eq!(record.id, first);
    assert_eq!(record.name, name);
    assert_eq!(record.content, Bytes::from_static(b"first"));

    let files = store.get_files(name).unwrap();
    let contents: Vec<_> = files.iter().map(|f| f.content.as_ref()).collect();
    assert_eq!(contents, [b"first".as_slice(), b"second".as_slice()]);
    assert_eq!(store.get_files("other").unwrap().len(), 1);
    assert!(store.get_files("missing").unwrap().is_empty());

    let large = Bytes::from(vec![0xA5; 1 << 20]);
    let id = store.add_file("large", large.clone()).unwrap();
    assert_eq!(store.get_file(id).unwrap().unwrap().content, large);
    assert!(store.delete_file(id).unwrap());
    assert_eq!(store.get_file(id).unwrap(), None);
    assert!(!store.delete_file(id).unwrap());
}

pub fn check_file_names(store: &mut impl FileStore) {
    let longest = "n".repeat(MAX_FILE_NAME);
    let id = store.add_file(&longest, Bytes::new()).unwrap();
    assert_eq!(store.get_file(id).unwrap().unwrap().name, longest);

    // the limit counts characters, not bytes
    let wide = "ї".repeat(MAX_FILE_NAME);
    let id = store.add_file(&wide, Bytes::new()).unwrap();
    assert_eq!(store.get_file(id).unwrap().unwrap().name, wide);

    assert_matches!(store.add_file("", Bytes::new()), Err(StoreErr::Name(0)));
    assert_matches!(
        store.add_file(&"n".repeat(MAX_FILE_NAME + 1), Bytes::new()),
        Err(StoreErr::Name(256))
    );
}
