mod components;
mod config;
mod error;
mod hooks;
mod models;
mod store;
mod utils;
mod views;

use leptos::*;

use components::{BackToTop, LogTools, TopTabs};
use config::AppConfig;
use hooks::DataContext;
use utils::log_trace::init_logging;
use views::{MagazineDetailView, PrizeListView, ReleaseListView, ServiceListView};

// ============================================
// ハッシュルーティング
// ============================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `#/` 発売日一覧
    Releases,
    /// `#/prizes`
    Prizes,
    /// `#/services`
    Services,
    /// `#/magazine/{id}`
    Magazine(String),
}

impl Route {
    /// `location.hash` からルートを決める（不明なものは発売日一覧）
    pub fn parse(hash: &str) -> Self {
        let path = hash.trim_start_matches('#').trim_start_matches('/');
        let path = path.trim_end_matches('/');
        match path {
            "prizes" => Route::Prizes,
            "services" => Route::Services,
            _ => match path.strip_prefix("magazine/") {
                Some(raw) => {
                    let id = urlencoding::decode(raw).map(|s| s.into_owned()).unwrap_or_else(|_| raw.to_string());
                    if id.trim().is_empty() {
                        Route::Releases
                    } else {
                        Route::Magazine(id)
                    }
                }
                None => Route::Releases,
            },
        }
    }

    pub fn href(&self) -> String {
        match self {
            Route::Releases => "#/".to_string(),
            Route::Prizes => "#/prizes".to_string(),
            Route::Services => "#/services".to_string(),
            Route::Magazine(id) => format!("#/magazine/{}", urlencoding::encode(id)),
        }
    }

    /// 上部タブで強調するルート（詳細ページは発売日タブ扱い）
    pub fn tab(&self) -> Route {
        match self {
            Route::Magazine(_) => Route::Releases,
            other => other.clone(),
        }
    }
}

fn current_route() -> Route {
    let hash = window().location().hash().unwrap_or_default();
    Route::parse(&hash)
}

// ============================================
// アプリ本体
// ============================================

#[component]
fn App(config: AppConfig) -> impl IntoView {
    provide_context(DataContext::browser(config));

    let (raw_route, set_raw_route) = create_signal(current_route());
    let route = create_memo(move |_| raw_route.get());

    let listener = window_event_listener(ev::hashchange, move |_| {
        let next = current_route();
        tracing::debug!(route = ?next, "route changed");
        set_raw_route.set(next);
    });
    on_cleanup(move || listener.remove());

    view! {
        <div class="app">
            <header class="app-header">
                <h1><a href=Route::Releases.href()>"漫画雑誌 発売日ナビ"</a></h1>
                <TopTabs route=route />
            </header>

            <main class="container">
                {move || match route.get() {
                    Route::Releases => view! { <ReleaseListView /> }.into_view(),
                    Route::Prizes => view! { <PrizeListView /> }.into_view(),
                    Route::Services => view! { <ServiceListView /> }.into_view(),
                    Route::Magazine(id) => view! { <MagazineDetailView magazine_id=id /> }.into_view(),
                }}
            </main>

            <LogTools />
            <BackToTop />
        </div>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    init_logging();

    let config = AppConfig::resolve();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "GAS endpoint is not configured");
    }

    mount_to_body(move || view! { <App config=config /> });
}
