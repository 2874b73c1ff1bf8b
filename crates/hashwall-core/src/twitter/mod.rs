//! Twitter - リモート ItemSource 実装
//!
//! # 構成
//! - **credentials**: 環境変数からの OAuth 認証情報
//! - **oauth**: OAuth 1.0a 署名（HMAC-SHA1）
//! - **client**: search（ページング）と filter stream
//! - **stream**: 改行区切り JSON のデコーダ

pub mod client;
pub mod credentials;
pub mod oauth;
pub mod stream;

pub use self::client::TwitterClient;
pub use self::credentials::Credentials;
pub use self::oauth::OAuthSigner;
pub use self::stream::LineItemStream;
