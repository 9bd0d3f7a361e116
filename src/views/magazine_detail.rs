//! 雑誌詳細ビュー
//!
//! 1冊の雑誌と、その号に載っている懸賞・全プレをまとめて表示する。

use leptos::*;

use crate::components::{PrizeCard, ServiceCard, StatusBox};
use crate::hooks::{use_applied_prizes, use_magazines, use_prizes, use_services};
use crate::models::Magazine;
use crate::utils::listing::{combine_status, list_state, magazine_detail, ListState};
use crate::utils::text::{clean, format_date_jp, normalize_date};
use crate::Route;

fn go_back() {
    let history = window().history();
    match history {
        Ok(h) if h.length().unwrap_or(0) > 1 => {
            let _ = h.back();
        }
        _ => {
            let _ = window().location().set_hash(&Route::Releases.href());
        }
    }
}

#[component]
fn MagazineHeader(magazine: Magazine) -> impl IntoView {
    let title = clean(&magazine.title);
    let cover = clean(&magazine.cover_image_url);
    let price = clean(&magazine.price);
    let amazon = clean(&magazine.purchase_url);
    let ebook = clean(&magazine.ebook_url);
    let release = normalize_date(&magazine.release_date);
    let has_links = !amazon.is_empty() || !ebook.is_empty();

    view! {
        <section class="detail-header">
            {(!cover.is_empty()).then(|| view! {
                <img class="cover large" src=cover alt=title.clone() />
            })}
            <div class="detail-info">
                <h2>
                    {title.clone()}
                    {magazine.is_adult.then(|| view! { <span class="badge r18">"R18"</span> })}
                </h2>
                <p class="release">
                    "発売日: "
                    {if release.is_empty() { "不明".to_string() } else { format_date_jp(&release) }}
                </p>
                {(!price.is_empty()).then(|| view! { <p class="price">{price}"円"</p> })}
                <div class="shop-links">
                    {(!amazon.is_empty()).then(|| view! {
                        <a class="btn dark" href=amazon target="_blank" rel="noreferrer">"Amazonで購入"</a>
                    })}
                    {(!ebook.is_empty()).then(|| view! {
                        <a class="btn blue" href=ebook target="_blank" rel="noreferrer">"電子版を購入"</a>
                    })}
                    {(!has_links).then(|| view! { <span class="muted">"購入リンクは未登録です"</span> })}
                </div>
            </div>
        </section>
    }
}

#[component]
pub fn MagazineDetailView(magazine_id: String) -> impl IntoView {
    let magazines = use_magazines();
    let prizes = use_prizes();
    let services = use_services();
    let applied = use_applied_prizes();
    let magazine_id = store_value(magazine_id);

    let detail = create_memo(move |_| {
        magazines.state.with(|m| {
            prizes.state.with(|p| {
                services.state.with(|s| {
                    magazine_id.with_value(|id| magazine_detail(id, &m.items, &p.items, &s.items))
                })
            })
        })
    });

    let status = move || {
        let errors = [magazines.error(), prizes.error(), services.error()];
        let (loading, error) = combine_status(
            &[magazines.loading(), prizes.loading(), services.loading()],
            &[errors[0].as_str(), errors[1].as_str(), errors[2].as_str()],
        );
        list_state(loading, error, detail.with(|d| usize::from(d.magazine.is_some())))
    };

    view! {
        <div class="magazine-detail">
            <div class="toolbar">
                <button class="btn soft small" on:click=move |_| go_back()>"← 戻る"</button>
                <a class="btn soft small" href=Route::Releases.href()>"発売日一覧へ"</a>
            </div>

            {move || match status() {
                ListState::Empty => view! { <div class="status empty">"（雑誌が見つかりません）"</div> }.into_view(),
                state => view! { <StatusBox state=state empty_message="" /> }.into_view(),
            }}

            {move || detail.get().magazine.map(|m| view! { <MagazineHeader magazine=m /> })}

            {move || {
                let d = detail.get();
                if d.magazine.is_none() {
                    return ().into_view();
                }
                if d.prizes.is_empty() && d.services.is_empty() {
                    return view! {
                        <p class="muted">"この号に登録されている「懸賞 / 応募者全員サービス」はまだありません"</p>
                    }
                    .into_view();
                }
                view! {
                    {(!d.prizes.is_empty()).then(|| view! {
                        <section class="detail-section">
                            <h3>"懸賞"</h3>
                            <div class="prize-grid">
                                {d.prizes.into_iter().map(|(key, prize)| view! {
                                    <PrizeCard applied_key=key prize=prize applied=applied />
                                }).collect_view()}
                            </div>
                        </section>
                    })}
                    {(!d.services.is_empty()).then(|| view! {
                        <section class="detail-section">
                            <h3>"応募者全員サービス"</h3>
                            <div class="prize-grid">
                                {d.services.into_iter().map(|service| view! {
                                    <ServiceCard service=service />
                                }).collect_view()}
                            </div>
                        </section>
                    })}
                }
                .into_view()
            }}
        </div>
    }
}
