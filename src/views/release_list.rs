//! 発売日一覧ビュー
//!
//! 月ごとに発売予定の雑誌を日付別にまとめて表示する。

use leptos::*;

use crate::components::{DateSection, StatusBox};
use crate::hooks::use_magazines;
use crate::utils::listing::{filter_releases, group_by_date, list_state, month_options, reconcile_month, ReleaseFilter};
use crate::utils::text::{add_months, current_month_jst, format_month_jp};

#[component]
pub fn ReleaseListView() -> impl IntoView {
    let magazines = use_magazines();

    let (month, set_month) = create_signal(String::new());
    let (keyword, set_keyword) = create_signal(String::new());
    let (all_months, set_all_months) = create_signal(false);
    // ユーザーが選んだ月は候補にある限り維持する
    let (month_touched, set_month_touched) = create_signal(false);

    let options = create_memo(move |_| magazines.state.with(|s| month_options(&s.items)));

    // 候補が変わったら表示月を合わせる（選んだ月が消えた場合も最新月へ）
    create_effect(move |_| {
        let opts = options.get();
        let next = reconcile_month(&month.get_untracked(), month_touched.get_untracked(), &opts, &current_month_jst());
        if next != month.get_untracked() {
            set_month.set(next);
        }
    });

    let select_month = move |m: String| {
        set_month_touched.set(true);
        set_month.set(m);
    };

    let groups = create_memo(move |_| {
        let filter = ReleaseFilter {
            month: month.get(),
            keyword: keyword.get(),
            all_months: all_months.get(),
        };
        magazines.state.with(|s| group_by_date(&filter_releases(&s.items, &filter)))
    });

    let count = move || groups.with(|gs| gs.iter().map(|g| g.items.len()).sum::<usize>());

    // 選択中の月が候補に無くても選択肢に出す
    let select_options = move || {
        let mut opts = options.get();
        let current = month.get();
        if !current.is_empty() && !opts.contains(&current) {
            opts.push(current);
            opts.sort_by(|a, b| b.cmp(a));
        }
        opts
    };

    view! {
        <div class="release-list">
            <div class="toolbar">
                <div class="month-nav">
                    <button class="btn soft small" disabled=move || all_months.get()
                        on:click=move |_| select_month(add_months(&month.get_untracked(), -1))>
                        "◀ 前月"
                    </button>
                    <select
                        disabled=move || all_months.get()
                        on:change=move |ev| select_month(event_target_value(&ev))
                    >
                        {move || {
                            let current = month.get();
                            select_options().into_iter().map(|m| {
                                let selected = m == current;
                                view! {
                                    <option value=m.clone() selected=selected>{format_month_jp(&m)}</option>
                                }
                            }).collect_view()
                        }}
                    </select>
                    <button class="btn soft small" disabled=move || all_months.get()
                        on:click=move |_| select_month(current_month_jst())>
                        "今月"
                    </button>
                    <button class="btn soft small" disabled=move || all_months.get()
                        on:click=move |_| select_month(add_months(&month.get_untracked(), 1))>
                        "次月 ▶"
                    </button>
                </div>

                <label class="check">
                    <input type="checkbox" checked=move || all_months.get()
                        on:change=move |ev| set_all_months.set(event_target_checked(&ev)) />
                    " 全期間から検索"
                </label>

                <input type="search" class="keyword" placeholder="雑誌名・発売日で検索"
                    prop:value=move || keyword.get()
                    on:input=move |ev| set_keyword.set(event_target_value(&ev)) />

                <button class="btn soft small" disabled=move || magazines.loading()
                    on:click=move |_| magazines.refresh()>
                    "更新"
                </button>
            </div>

            <p class="count">
                {move || if all_months.get() {
                    "全期間".to_string()
                } else {
                    format_month_jp(&month.get())
                }}
                " / " {count} "件"
            </p>

            {move || {
                let state = magazines.state.with(|s| list_state(s.loading, &s.error, count()));
                view! { <StatusBox state=state empty_message="この月の発売予定はありません" /> }
            }}

            {move || groups.get().into_iter().map(|group| view! { <DateSection group=group /> }).collect_view()}
        </div>
    }
}
