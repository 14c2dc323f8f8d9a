//! Ports - 抽象化レイヤー
//!
//! 外部資源（永続化媒体、クライアント接続）へのインターフェース。
//! 実装は `impls` に置き、テストでは差し替える。

pub mod document_store;
pub mod responder;

pub use self::document_store::DocumentStore;
pub use self::responder::Responder;
