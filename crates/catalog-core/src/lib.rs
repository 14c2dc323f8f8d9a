//! catalog-core
//!
//! Priority-scheduled request server over a durable, uniquely keyed record
//! registry.
//!
//! # モジュール構成
//! - **domain**: レコード、優先度、ワイヤ上のリクエスト／レスポンス
//! - **ports**: 抽象化レイヤー（DocumentStore, Responder）
//! - **impls**: ports の実装と PriorityDispatchQueue
//! - **store**: 唯一の排他区間を持つ RecordStore
//! - **task** / **worker**: キューに載る Task と WorkerGroup
//! - **listener**: TCP 受付（1 接続 1 メッセージ）
//! - **app**: 設定・ビルダー・起動
//! - **client**: 1 リクエスト分のクライアント
//!
//! Flow: listener -> dispatch queue -> worker -> store -> reply on the
//! connection the listener accepted. Priority orders admission only; the
//! store's lock orders execution.

pub mod app;
pub mod client;
pub mod domain;
pub mod error;
pub mod impls;
pub mod listener;
pub mod ports;
pub mod store;
pub mod task;
pub mod worker;

pub use app::{RunningServer, Server, ServerBuilder, ServerConfig};
pub use error::CatalogError;
