//! Impls - ports の実装とディスパッチキュー
//!
//! # 含まれる実装
//! - **JsonFileDocument**: 本番用の永続化（JSON 文書 1 つ、rename による原子的置換）
//! - **InMemoryDocument**: テスト用の永続化（障害注入つき）
//! - **PriorityDispatchQueue**: (priority, seq) 順の blocking キュー
//! - **TcpResponder** / **ChannelResponder**: 返信ハンドル

pub mod channel_responder;
pub mod inmem_document;
pub mod json_document;
pub mod priority_queue;
pub mod tcp_responder;

pub use self::channel_responder::{ChannelResponder, Reply};
pub use self::inmem_document::InMemoryDocument;
pub use self::json_document::JsonFileDocument;
pub use self::priority_queue::{PriorityDispatchQueue, Queued};
pub use self::tcp_responder::TcpResponder;
