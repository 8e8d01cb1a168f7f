use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::Point;
use super::state::AirportMapState;

const COUNTRY_FILL: &str = "steelblue";
const BORDER_STROKE: &str = "white";
const LINK_STROKE: &str = "rgba(153, 153, 153, 0.6)";
const NODE_FILL: &str = "#F4AE3D";
const NODE_STROKE: &str = "#fff";
const HOVER_STROKE: &str = "#333";

pub fn render(state: &AirportMapState, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_map(state, ctx);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn trace(ctx: &CanvasRenderingContext2d, points: &[Point], close: bool) {
	let Some((&(x0, y0), rest)) = points.split_first() else {
		return;
	};
	ctx.move_to(x0, y0);
	for &(x, y) in rest {
		ctx.line_to(x, y);
	}
	if close {
		ctx.close_path();
	}
}

fn draw_map(state: &AirportMapState, ctx: &CanvasRenderingContext2d) {
	let opacity = state.scene.map_opacity;
	if opacity <= 0.0 {
		return;
	}
	ctx.set_global_alpha(opacity);

	ctx.set_fill_style_str(COUNTRY_FILL);
	for area in &state.scene.countries {
		ctx.begin_path();
		for ring in &area.rings {
			trace(ctx, ring, true);
		}
		// inner rings are holes
		ctx.fill_with_canvas_winding_rule(web_sys::CanvasWindingRule::Evenodd);
	}

	ctx.set_stroke_style_str(BORDER_STROKE);
	ctx.set_line_width(0.5);
	ctx.begin_path();
	for line in &state.scene.borders {
		trace(ctx, line, false);
	}
	ctx.stroke();

	ctx.set_global_alpha(1.0);
}

fn draw_links(state: &AirportMapState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(LINK_STROKE);
	ctx.set_line_width(2.0);
	ctx.begin_path();
	for line in &state.scene.lines {
		ctx.move_to(line.x1, line.y1);
		ctx.line_to(line.x2, line.y2);
	}
	ctx.stroke();
}

fn draw_nodes(state: &AirportMapState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(NODE_FILL);
	ctx.set_line_width(1.5);
	for (idx, circle) in state.scene.circles.iter().enumerate() {
		ctx.begin_path();
		let _ = ctx.arc(circle.cx, circle.cy, circle.r, 0.0, 2.0 * PI);
		ctx.fill();
		let stroke = if state.hover.node == Some(idx) {
			HOVER_STROKE
		} else {
			NODE_STROKE
		};
		ctx.set_stroke_style_str(stroke);
		ctx.stroke();
	}
}
