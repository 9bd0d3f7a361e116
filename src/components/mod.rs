//! UIコンポーネントモジュール

pub mod back_to_top;
pub mod log_tools;
pub mod magazine_card;
pub mod prize_card;
pub mod status_box;
pub mod top_tabs;

pub use back_to_top::BackToTop;
pub use log_tools::LogTools;
pub use magazine_card::{DateSection, MagazineCard};
pub use prize_card::{PrizeCard, ServiceCard};
pub use status_box::StatusBox;
pub use top_tabs::TopTabs;
