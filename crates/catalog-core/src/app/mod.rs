//! App - 構成要素の組み立てと起動
//!
//! # 主要コンポーネント
//! - **ServerConfig**: 既定値つきの設定
//! - **ServerBuilder**: 起動前検証（Fail-fast）つきのビルダー
//! - **Server / RunningServer**: listener + worker group + store のワイヤリング

pub mod builder;
pub mod config;
pub mod server;

pub use self::builder::{BuildError, ServerBuilder};
pub use self::config::ServerConfig;
pub use self::server::{RunningServer, Server};
