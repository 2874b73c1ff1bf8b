//! hashwall-core
//!
//! Core building blocks for the hashtag image wall.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, record, item, extract, outcome, query, errors）
//! - **ports**: 抽象化レイヤー（RecordStore, ItemSource, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（IngestionPolicy, PullDriver, StreamDriver）
//! - **impls**: 実装（InMemoryRecordStore, SqliteRecordStore, StaticItemSource）
//! - **twitter**: リモート API 実装（OAuth 署名, search, filter stream）
//! - **config**: 設定（容量上限, DB パス, .env 読み込み）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod twitter;
