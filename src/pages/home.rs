use leptos::prelude::*;
use log::warn;

use crate::components::airport_map::{AirportMapCanvas, LayoutMode};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (mode, set_mode) = signal(LayoutMode::Force);

	let on_change = move |ev: leptos::ev::Event| match event_target_value(&ev).parse::<LayoutMode>() {
		Ok(next) => set_mode.set(next),
		Err(e) => warn!("{e}"),
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="airport-page">
				<h1>"Airports"</h1>
				<form class="layout-options">
					{[LayoutMode::Force, LayoutMode::Map]
						.into_iter()
						.map(|option| {
							view! {
								<label>
									<input
										type="radio"
										name="option"
										value=option.as_str()
										prop:checked=move || mode.get() == option
										on:change=on_change
									/>
									{option.as_str()}
								</label>
							}
						})
						.collect_view()}
				</form>
				<div class="node-link">
					<AirportMapCanvas mode=mode />
				</div>
			</div>
		</ErrorBoundary>
	}
}
