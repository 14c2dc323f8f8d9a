//! Domain model (records, priorities, wire messages).
//!
//! このモジュールは I/O を持たない。キュー・ストア・ソケットの前提を置かず、
//! 「何を運ぶか」の形だけを定義する。

pub mod priority;
pub mod record;
pub mod request;
pub mod response;

pub use self::priority::Priority;
pub use self::record::{Position, Record};
pub use self::request::{Operation, Request};
pub use self::response::{Response, Status};
