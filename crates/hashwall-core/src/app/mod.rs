//! App - アプリケーション層
//!
//! ports を組み合わせてパイプラインを実装します。
//!
//! # 主要コンポーネント
//! - **IngestionPolicy**: 重複排除 + 上限付きの取り込み（中核）
//! - **PullDriver**: 検索結果を読み切って取り込む
//! - **StreamDriver**: push されたアイテムを取り込み続ける

pub mod policy;
pub mod pull;
pub mod stream;

// 主要な型を再エクスポート
pub use self::policy::IngestionPolicy;
pub use self::pull::PullDriver;
pub use self::stream::StreamDriver;
