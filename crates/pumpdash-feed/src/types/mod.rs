/*
[INPUT]:  Dashboard wire schema and store requirements
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - store models and feed payloads
[UPDATE]: When the wire schema changes or new types added
*/

pub mod enums;
pub mod models;
pub mod updates;

pub use enums::*;
pub use models::*;
pub use updates::*;
