//! 雑誌カード（発売日一覧用）

use leptos::*;

use crate::models::Magazine;
use crate::utils::listing::DateGroup;
use crate::utils::text::{clean, format_date_jp};
use crate::Route;

/// 一覧ではR18の表紙をぼかす（詳細ページではぼかさない）
#[component]
pub fn MagazineCard(magazine: Magazine) -> impl IntoView {
    let id = clean(&magazine.magazine_id);
    let title = clean(&magazine.title);
    let price = clean(&magazine.price);
    let cover = clean(&magazine.cover_image_url);
    let amazon = clean(&magazine.purchase_url);
    let ebook = clean(&magazine.ebook_url);
    let detail_href = (!id.is_empty()).then(|| Route::Magazine(id.clone()).href());

    view! {
        <article class="magazine-card">
            <div class="cover-box">
                {if cover.is_empty() {
                    view! { <div class="cover-fallback"></div> }.into_view()
                } else {
                    view! {
                        <img
                            class=if magazine.is_adult { "cover blur" } else { "cover" }
                            src=cover
                            alt=title.clone()
                            loading="lazy"
                        />
                    }.into_view()
                }}
                {magazine.is_adult.then(|| view! { <span class="badge r18">"R18"</span> })}
            </div>
            <div class="magazine-body">
                {match detail_href {
                    Some(href) => view! { <a class="magazine-title" href=href>{title.clone()}</a> }.into_view(),
                    None => view! { <span class="magazine-title">{title.clone()}</span> }.into_view(),
                }}
                {(!price.is_empty()).then(|| view! { <div class="price">{price}"円"</div> })}
                <div class="shop-links">
                    {(!amazon.is_empty()).then(|| view! {
                        <a class="btn dark" href=amazon target="_blank" rel="noreferrer">"Amazon"</a>
                    })}
                    {(!ebook.is_empty()).then(|| view! {
                        <a class="btn blue" href=ebook target="_blank" rel="noreferrer">"電子版"</a>
                    })}
                </div>
            </div>
        </article>
    }
}

/// 同じ発売日の雑誌をまとめた見出し付きセクション
#[component]
pub fn DateSection(group: DateGroup) -> impl IntoView {
    // 「発売日不明」はそのまま出る
    let heading = format_date_jp(&group.date_key);

    view! {
        <section class="date-section">
            <h2 class="date-heading">{heading}</h2>
            <div class="magazine-grid">
                {group.items.into_iter().map(|m| view! { <MagazineCard magazine=m /> }).collect_view()}
            </div>
        </section>
    }
}
