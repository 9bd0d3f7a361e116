//! 上部タブ

use leptos::*;

use crate::Route;

#[component]
pub fn TopTabs(#[prop(into)] route: Signal<Route>) -> impl IntoView {
    let tab = move |target: Route, label: &'static str| {
        let href = target.href();
        view! {
            <a
                href=href
                class=move || if route.get().tab() == target { "tab active" } else { "tab" }
            >
                {label}
            </a>
        }
    };

    view! {
        <nav class="tabs">
            {tab(Route::Releases, "発売日")}
            {tab(Route::Prizes, "懸賞")}
            {tab(Route::Services, "全プレ")}
        </nav>
    }
}
