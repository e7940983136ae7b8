pub(crate) mod bytes;

pub use self::bytes::word_value;
