//! 懸賞・全員サービスのカード

use leptos::*;

use crate::hooks::AppliedPrizesHandle;
use crate::models::{Magazine, Prize, Service};
use crate::utils::listing::is_expired;
use crate::utils::text::{clean, format_date_jp, normalize_date, split_by_comma, today_jst};
use crate::Route;

fn deadline_label(deadline: &str) -> String {
    let ymd = normalize_date(deadline);
    if ymd.is_empty() {
        "締切不明".to_string()
    } else {
        format!("締切: {}", format_date_jp(&ymd))
    }
}

/// 「内容」をカンマ区切りで箇条書きにする
fn content_list(content: &str) -> impl IntoView {
    let items = split_by_comma(content);
    (!items.is_empty()).then(|| {
        view! {
            <ul class="content-list">
                {items.into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
            </ul>
        }
    })
}

#[component]
pub fn PrizeCard(
    /// 応募済み管理用キー
    applied_key: String,
    prize: Prize,
    /// 掲載誌（一覧では表示、詳細ページでは None）
    #[prop(optional_no_strip)]
    magazine: Option<Magazine>,
    #[prop(optional_no_strip)]
    magazine_title: Option<String>,
    applied: AppliedPrizesHandle,
) -> impl IntoView {
    let expired = is_expired(&prize.deadline, today_jst());
    let apply_url = clean(&prize.apply_url);
    let how_to_apply = clean(&prize.how_to_apply);
    let key = store_value(applied_key);

    let is_applied = move || key.with_value(|k| applied.has(k));
    let on_toggle = move |_| key.with_value(|k| applied.toggle(k));

    let magazine_block = magazine_title.map(|title| {
        let mag_id = clean(&prize.magazine_id);
        let amazon = magazine.as_ref().map(|m| clean(&m.purchase_url)).unwrap_or_default();
        let ebook = magazine.as_ref().map(|m| clean(&m.ebook_url)).unwrap_or_default();
        view! {
            <div class="prize-magazine">
                {if mag_id.is_empty() {
                    view! { <span>{title}</span> }.into_view()
                } else {
                    view! { <a href=Route::Magazine(mag_id).href()>{title}</a> }.into_view()
                }}
                <span class="shop-links">
                    {(!amazon.is_empty()).then(|| view! {
                        <a class="btn dark small" href=amazon target="_blank" rel="noreferrer">"Amazon"</a>
                    })}
                    {(!ebook.is_empty()).then(|| view! {
                        <a class="btn blue small" href=ebook target="_blank" rel="noreferrer">"電子版"</a>
                    })}
                </span>
            </div>
        }
    });

    view! {
        <article class=move || {
            let mut class = String::from("prize-card");
            if expired {
                class.push_str(" expired");
            }
            if is_applied() {
                class.push_str(" applied");
            }
            class
        }>
            {magazine_block}
            <h3 class="prize-name">{clean(&prize.name)}</h3>
            {content_list(&prize.content)}
            <div class="prize-meta">
                <span class="deadline">{deadline_label(&prize.deadline)}</span>
                {expired.then(|| view! { <span class="badge expired">"締切済み"</span> })}
            </div>
            {(!how_to_apply.is_empty()).then(|| view! { <p class="how-to-apply">{how_to_apply}</p> })}
            <div class="prize-actions">
                {(!apply_url.is_empty()).then(|| view! {
                    <a class="btn" href=apply_url target="_blank" rel="noreferrer">"WEB応募"</a>
                })}
                <button
                    class=move || if is_applied() { "btn applied" } else { "btn soft" }
                    disabled=move || !applied.ready()
                    on:click=on_toggle
                >
                    {move || if is_applied() { "応募済み" } else { "未応募" }}
                </button>
            </div>
        </article>
    }
}

#[component]
pub fn ServiceCard(
    service: Service,
    #[prop(optional_no_strip)]
    magazine_title: Option<String>,
) -> impl IntoView {
    let how_to_apply = clean(&service.how_to_apply);
    let mag_id = clean(&service.magazine_id);

    let magazine_block = magazine_title.map(|title| {
        let title = if title.is_empty() { mag_id.clone() } else { title };
        if mag_id.is_empty() {
            view! { <div class="prize-magazine">{title}</div> }.into_view()
        } else {
            view! {
                <div class="prize-magazine">
                    <a href=Route::Magazine(mag_id.clone()).href()>{title}</a>
                </div>
            }
            .into_view()
        }
    });

    view! {
        <article class="prize-card service">
            {magazine_block}
            {content_list(&service.content)}
            <div class="prize-meta">
                <span class="deadline">{deadline_label(&service.deadline)}</span>
            </div>
            {(!how_to_apply.is_empty()).then(|| view! { <p class="how-to-apply">{how_to_apply}</p> })}
        </article>
    }
}
