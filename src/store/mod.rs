//! データアクセス層
//!
//! リモート取得・キャッシュ・ローカル設定をUIから切り離して持つ。Leptosへの接続は `hooks` 側。

pub mod applied;
pub mod collection;

pub use applied::AppliedPrizes;
pub use collection::{CollectionResource, CollectionState};
