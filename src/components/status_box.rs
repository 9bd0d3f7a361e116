//! 読み込み中 / エラー / 0件 の表示

use leptos::*;

use crate::utils::listing::ListState;

#[component]
pub fn StatusBox(state: ListState, empty_message: &'static str) -> impl IntoView {
    match state {
        ListState::Loading => view! { <div class="status loading">"読み込み中..."</div> }.into_view(),
        ListState::Error(e) => view! { <div class="status error">{e}</div> }.into_view(),
        ListState::Empty => view! { <div class="status empty">{empty_message}</div> }.into_view(),
        ListState::Populated => view! { <></> }.into_view(),
    }
}
