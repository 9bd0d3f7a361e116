//! 懸賞一覧ビュー

use leptos::*;

use crate::components::{PrizeCard, StatusBox};
use crate::hooks::{use_applied_prizes, use_magazines, use_prizes};
use crate::utils::listing::{combine_status, list_state, prize_rows, PrizeFilter, SortMode};
use crate::utils::text::today_jst;

#[component]
pub fn PrizeListView() -> impl IntoView {
    let magazines = use_magazines();
    let prizes = use_prizes();
    let applied = use_applied_prizes();

    let (show_expired, set_show_expired) = create_signal(false);
    let (sort_mode, set_sort_mode) = create_signal(SortMode::default());
    let (keyword, set_keyword) = create_signal(String::new());

    let rows = create_memo(move |_| {
        let filter = PrizeFilter {
            show_expired: show_expired.get(),
            sort_mode: sort_mode.get(),
            keyword: keyword.get(),
        };
        prizes.state.with(|p| magazines.state.with(|m| prize_rows(&p.items, &m.items, &filter, today_jst())))
    });

    let on_clear = move |_| {
        let ok = window()
            .confirm_with_message("応募済みの記録をすべて消去しますか？")
            .unwrap_or(false);
        if ok {
            applied.clear_all();
        }
    };

    let on_refresh = move |_| {
        prizes.refresh();
        magazines.refresh();
    };

    view! {
        <div class="prize-list">
            <div class="toolbar">
                <label class="check">
                    <input type="checkbox" checked=move || show_expired.get()
                        on:change=move |ev| set_show_expired.set(event_target_checked(&ev)) />
                    " 締切済みも表示"
                </label>

                <select on:change=move |ev| set_sort_mode.set(SortMode::from_value(&event_target_value(&ev)))>
                    <option value=SortMode::Deadline.as_str()
                        selected=move || sort_mode.get() == SortMode::Deadline>
                        "締切が近い順"
                    </option>
                    <option value=SortMode::Release.as_str()
                        selected=move || sort_mode.get() == SortMode::Release>
                        "発売日順"
                    </option>
                </select>

                <input type="search" class="keyword" placeholder="雑誌名・懸賞名・内容で検索"
                    prop:value=move || keyword.get()
                    on:input=move |ev| set_keyword.set(event_target_value(&ev)) />

                <button class="btn soft small"
                    disabled=move || prizes.loading() || magazines.loading()
                    on:click=on_refresh>
                    "更新"
                </button>
            </div>

            <div class="applied-summary">
                <span>"応募済み: " {move || applied.count()} "件"</span>
                <button class="btn soft small"
                    disabled=move || applied.count() == 0
                    on:click=on_clear>
                    "応募済みをすべて解除"
                </button>
            </div>

            <p class="count">{move || rows.with(|r| r.len())} "件"</p>

            {move || {
                let p_error = prizes.error();
                let m_error = magazines.error();
                let (loading, error) = combine_status(
                    &[prizes.loading(), magazines.loading()],
                    &[p_error.as_str(), m_error.as_str()],
                );
                let state = list_state(loading, error, rows.with(|r| r.len()));
                view! { <StatusBox state=state empty_message="該当する懸賞はありません" /> }
            }}

            <div class="prize-grid">
                {move || rows.get().into_iter().map(|row| {
                    let title = row.magazine_title();
                    view! {
                        <PrizeCard
                            applied_key=row.key
                            prize=row.prize
                            magazine=row.magazine
                            magazine_title=Some(title)
                            applied=applied
                        />
                    }
                }).collect_view()}
            </div>
        </div>
    }
}
