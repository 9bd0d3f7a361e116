//! 応募者全員サービス（全プレ）一覧ビュー

use leptos::*;

use crate::components::{ServiceCard, StatusBox};
use crate::hooks::{use_magazines, use_services};
use crate::utils::listing::{combine_status, list_state, service_rows};

#[component]
pub fn ServiceListView() -> impl IntoView {
    let magazines = use_magazines();
    let services = use_services();

    let rows = create_memo(move |_| {
        services.state.with(|s| magazines.state.with(|m| service_rows(&s.items, &m.items)))
    });

    view! {
        <div class="service-list">
            <div class="toolbar">
                <p class="count">{move || rows.with(|r| r.len())} "件"</p>
                <button class="btn soft small"
                    disabled=move || services.loading() || magazines.loading()
                    on:click=move |_| {
                        services.refresh();
                        magazines.refresh();
                    }>
                    "更新"
                </button>
            </div>

            {move || {
                let s_error = services.error();
                let m_error = magazines.error();
                let (loading, error) = combine_status(
                    &[services.loading(), magazines.loading()],
                    &[s_error.as_str(), m_error.as_str()],
                );
                let state = list_state(loading, error, rows.with(|r| r.len()));
                view! { <StatusBox state=state empty_message="登録されている全プレはありません" /> }
            }}

            <div class="prize-grid">
                {move || rows.get().into_iter().map(|row| view! {
                    <ServiceCard service=row.service magazine_title=Some(row.magazine_title) />
                }).collect_view()}
            </div>
        </div>
    }
}
