//! ページ単位のビュー

pub mod magazine_detail;
pub mod prize_list;
pub mod release_list;
pub mod service_list;

pub use magazine_detail::MagazineDetailView;
pub use prize_list::PrizeListView;
pub use release_list::ReleaseListView;
pub use service_list::ServiceListView;
