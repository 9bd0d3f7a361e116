//! ページ先頭へ戻るボタン

use leptos::*;

/// これ以上スクロールしたらボタンを出す（px）
const SHOW_AFTER_PX: f64 = 300.0;

fn should_show(scroll_y: f64) -> bool {
    scroll_y > SHOW_AFTER_PX
}

#[component]
pub fn BackToTop() -> impl IntoView {
    let (show, set_show) = create_signal(false);

    let listener = window_event_listener(ev::scroll, move |_| {
        let y = window().scroll_y().unwrap_or(0.0);
        set_show.set(should_show(y));
    });
    on_cleanup(move || listener.remove());

    let on_click = move |_| {
        let options = web_sys::ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(web_sys::ScrollBehavior::Smooth);
        window().scroll_to_with_scroll_to_options(&options);
    };

    view! {
        <Show when=move || show.get()>
            <button class="back-to-top" title="ページの先頭へ" on:click=on_click>"↑"</button>
        </Show>
    }
}
