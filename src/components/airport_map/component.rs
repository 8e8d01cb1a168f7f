use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::config::VisConfig;
use super::error::LoadError;
use super::loader;
use super::render;
use super::state::{AirportMapState, Tooltip};
use super::types::LayoutMode;

#[derive(Clone, Debug, PartialEq)]
enum LoadStatus {
	Loading,
	Ready,
	Failed(LoadError),
}

/// Display size: explicit props win, then the parent's box, then the
/// logical extent.
fn canvas_size(
	canvas: &HtmlCanvasElement,
	width: Option<f64>,
	height: Option<f64>,
	config: &VisConfig,
) -> (f64, f64) {
	let parent = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0);
	(
		width.or(parent.map(|p| p.0)).unwrap_or(config.width),
		height.or(parent.map(|p| p.1)).unwrap_or(config.height),
	)
}

/// Pushes hover state to the tooltip signal and the canvas title, writing
/// each only when it changed.
fn show_hover(canvas: &HtmlCanvasElement, s: &AirportMapState, tooltip: RwSignal<Option<Tooltip>>) {
	let tip = s.tooltip();
	if tooltip.with_untracked(|current| *current != tip) {
		tooltip.set(tip);
	}

	// native title tooltip stands in while the force layout is shown
	let title = match s.mode() {
		LayoutMode::Force => s.hovered_name().unwrap_or_default(),
		LayoutMode::Map => "",
	};
	if canvas.get_attribute("title").as_deref() != Some(title)
		&& canvas.set_attribute("title", title).is_err()
	{
		warn!("could not set canvas title");
	}
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn AirportMapCanvas(
	#[prop(into)] mode: Signal<LayoutMode>,
	#[prop(optional)] config: Option<VisConfig>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<AirportMapState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	let status = RwSignal::new(LoadStatus::Loading);
	let tooltip = RwSignal::new(None::<Tooltip>);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window available");
			return;
		};

		let (w, h) = canvas_size(&canvas, width, height, &config);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("canvas 2d context unavailable");
				return;
			}
		};

		// load → build → bind
		let (state_load, config_load) = (state_init.clone(), config.clone());
		spawn_local(async move {
			let bound = match loader::load(&config_load).await {
				Ok(docs) => AirportMapState::from_documents(docs, &config_load, w, h),
				Err(e) => Err(e),
			};
			match bound {
				Ok(mut s) => {
					s.switch_layout(mode.get_untracked());
					*state_load.borrow_mut() = Some(s);
					status.set(LoadStatus::Ready);
				}
				Err(e) => {
					error!("airport map setup failed: {e}");
					status.set(LoadStatus::Failed(e));
				}
			}
		});

		let (state_resize, canvas_resize, config_resize) =
			(state_init.clone(), canvas.clone(), config.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = canvas_size(&canvas_resize, width, height, &config_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, canvas_anim) =
			(state_init.clone(), animate_init.clone(), canvas.clone());
		let mut last = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = now - last;
			last = now;
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(dt);
				render::render(s, &ctx);
				show_hover(&canvas_anim, s, tooltip);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_mode = state.clone();
	Effect::new(move |_| {
		let target = mode.get();
		if let Some(ref mut s) = *state_mode.borrow_mut() {
			s.switch_layout(target);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.drag_start(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.is_dragging() {
				s.drag_move(x, y);
				return;
			}
			// the frame loop shows the result
			s.pointer_moved(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.drag_end();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag_end();
			s.pointer_left();
		}
		tooltip.set(None);
	};

	view! {
		<div class="airport-map" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="airport-map-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				style="display: block; cursor: grab;"
			/>
			<Show when=move || status.get() == LoadStatus::Loading>
				<p
					class="airport-map-status"
					style="position: absolute; top: 0; left: 0; margin: 0;"
				>"Loading airport data..."</p>
			</Show>
			{move || {
				tooltip
					.get()
					.map(|t| {
						view! {
							<div
								class="tooltip"
								style=format!(
									"position: absolute; display: block; left: {}px; top: {}px;",
									t.left,
									t.top,
								)
							>
								{t.text}
							</div>
						}
					})
			}}
			{move || match status.get() {
				LoadStatus::Failed(e) => Err(e),
				LoadStatus::Loading | LoadStatus::Ready => Ok(()),
			}}
		</div>
	}
}
