/// Declares an enum which dispatches `Iterator` to one of several concrete
/// iterator types, allowing a `match` to return a single `impl Iterator`.
macro_rules! MultiIter {
    ($type:ident, $($name:ident),+) => {
        #[must_use]
        pub(crate) enum $type<$($name),+> {
            $($name($name)),+
        }

        impl<T, $($name: Iterator<Item = T>),+> Iterator for $type<$($name),+> {
            type Item = T;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                match self {
                    $(Self::$name(iter) => iter.next(),)+
                }
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                match self {
                    $(Self::$name(iter) => iter.size_hint(),)+
                }
            }
        }

        impl<T, $($name: std::iter::FusedIterator<Item = T>),+> std::iter::FusedIterator
            for $type<$($name),+>
        {
        }
    };
}

pub(crate) use MultiIter;

/// Returns true if `text` is empty or whitespace only.
pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
