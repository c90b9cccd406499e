use leptos::prelude::*;
use wavpeek_core::session::SessionStatus;
use crate::state::ViewerState;

#[component]
pub fn DumpPanel() -> impl IntoView {
    let state = expect_context::<ViewerState>();

    let status = move || match state.status.get() {
        SessionStatus::NoSession if state.mime_type.get().is_some() => "no session",
        SessionStatus::NoSession => "no audio",
        SessionStatus::Loading(_) => "loading",
        SessionStatus::Ready(_) => "ready",
    };

    view! {
        <div class="dump-panel">
            <div class="dump-status">
                {status}
                {move || state.load_error.get().map(|e| view! { <span class="dump-error">{format!(" ({})", e)}</span> })}
            </div>
            {move || state.diagnostic.get().map(|text| view! { <pre class="dump-text">{text}</pre> })}
        </div>
    }
}
