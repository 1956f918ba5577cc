//! Small helper macros shared across crates.
//!

/// Build a `PathBuf` by joining a series of entries.
///
#[macro_export]
macro_rules! makepath {
    ($($item:expr),+) => {
        [
        $(::std::path::PathBuf::from($item),)+
        ]
        .iter()
        .collect::<::std::path::PathBuf>()
    };
}
