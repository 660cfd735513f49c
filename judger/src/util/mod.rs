mod deserialize;

pub use deserialize::*;
