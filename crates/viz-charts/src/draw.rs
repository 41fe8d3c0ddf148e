//! Models to scene nodes.
//!
//! Every hoverable primitive gets a predictable id derived from the chart
//! prefix, so hover restyles can find it again without a redraw. Each
//! [`HoverTarget`] lists the ids it owns plus the invisible trap shapes that
//! capture the pointer for it.

use crate::{
    chartkit::{format_percentage, format_value, TextAnchor},
    colors,
    donut::{center_lines, DonutModel},
    gauge::GaugeModel,
    radial_bar::RadialBarModel,
    scene::Node,
    vertical_bar::VerticalBarModel,
    waffle::WaffleModel,
    xy::XyModel,
    ChartModel,
};
use viz_core::{
    ChartConfig, DonutConfig, GaugeConfig, RadialBarConfig, SeriesKind, TooltipConfig, VerticalBarConfig,
    WaffleConfig, XyConfig,
};

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// One tooltip line
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub color: String,
    pub name: String,
    pub value: String,
    pub percentage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipContent {
    pub title: String,
    pub rows: Vec<TooltipRow>,
}

/// Hoverable unit: a segment, ring, bar row, waffle series or xy slot
#[derive(Debug, Clone, PartialEq)]
pub struct HoverTarget {
    /// Dataset index (xy: slot index)
    pub index: usize,
    pub element_ids: Vec<String>,
    /// Invisible shapes capturing the pointer, without ids
    pub traps: Vec<Node>,
    pub tooltip: TooltipContent,
}

/// Drawn nodes plus what the interaction layer needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub nodes: Vec<Node>,
    pub targets: Vec<HoverTarget>,
}

#[derive(Debug, Clone, Copy)]
pub struct DrawOptions<'a> {
    /// Unique per chart instance; prefixes every element id
    pub prefix: &'a str,
    /// Toolkit label toggle
    pub show_labels: bool,
}

/// `{prefix}-{part}-{index}`
pub fn element_id(prefix: &str, part: &str, index: usize) -> String {
    format!("{}-{}-{}", prefix, part, index)
}

/// Round for attribute output
fn px(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn text_node(x: f64, y: f64, anchor: TextAnchor, size: f64, fill: &str, text: impl Into<String>) -> Node {
    Node::new("text")
        .attr("x", px(x))
        .attr("y", px(y))
        .attr("text-anchor", anchor.as_str())
        .attr("font-size", size)
        .attr("fill", fill)
        .text(text)
}

fn single_row(
    tooltip: &TooltipConfig,
    name: &str,
    color: &str,
    value: f64,
    proportion: f64,
) -> TooltipContent {
    TooltipContent {
        title: name.to_string(),
        rows: vec![TooltipRow {
            color: color.to_string(),
            name: name.to_string(),
            value: format_value(value, tooltip.rounding_value),
            percentage: Some(format_percentage(proportion, tooltip.rounding_percentage)),
        }],
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Build the nodes of one render pass
pub fn draw(model: &ChartModel, config: &ChartConfig, options: &DrawOptions<'_>) -> Drawing {
    let canvas = config.canvas();
    let (width, height) = model
        .area()
        .map(|a| (a.full_width, a.full_height))
        .unwrap_or((canvas.width, canvas.height));

    let mut drawing = Drawing::default();
    drawing.nodes.push(
        Node::new("rect")
            .with_id(format!("{}-background", options.prefix))
            .attr("x", 0)
            .attr("y", 0)
            .attr("width", px(width))
            .attr("height", px(height))
            .attr("fill", &canvas.background),
    );

    match (model, config) {
        (ChartModel::Donut(m), ChartConfig::Donut(cfg)) => draw_donut(m, cfg, options, &mut drawing),
        (ChartModel::Gauge(m), ChartConfig::Gauge(cfg)) => draw_gauge(m, cfg, options, &mut drawing),
        (ChartModel::RadialBar(m), ChartConfig::RadialBar(cfg)) => draw_radial_bar(m, cfg, options, &mut drawing),
        (ChartModel::VerticalBar(m), ChartConfig::VerticalBar(cfg)) => {
            draw_vertical_bar(m, cfg, options, &mut drawing)
        }
        (ChartModel::Waffle(m), ChartConfig::Waffle(cfg)) => draw_waffle(m, cfg, options, &mut drawing),
        (ChartModel::Xy(m), ChartConfig::Xy(cfg)) => draw_xy(m, cfg, options, &mut drawing),
        _ => {}
    }

    drawing
}

// ============================================================================
// DONUT
// ============================================================================

fn draw_donut(m: &DonutModel, cfg: &DonutConfig, options: &DrawOptions<'_>, out: &mut Drawing) {
    let p = options.prefix;

    if cfg.use_gradient && !m.arcs.is_empty() {
        let gradients = m.arcs.iter().map(|arc| {
            let stops = colors::gradient_stops(&arc.color, cfg.gradient_intensity)
                .into_iter()
                .map(|(offset, color)| Node::new("stop").attr("offset", format!("{}%", offset)).attr("stop-color", color));
            Node::new("radialGradient")
                .with_id(element_id(p, "gradient", arc.index))
                .attr("gradientUnits", "userSpaceOnUse")
                .attr("cx", px(m.center.0))
                .attr("cy", px(m.center.1))
                .attr("r", px(m.outer_radius))
                .children(stops)
        });
        out.nodes.push(Node::new("defs").with_id(format!("{}-defs", p)).children(gradients));
    }

    let mut arcs = Node::new("g").with_id(format!("{}-arcs", p));
    let mut labels = Node::new("g").with_id(format!("{}-labels", p));
    let show_labels = cfg.show_data_labels && options.show_labels;

    for arc in &m.arcs {
        let arc_id = element_id(p, "arc", arc.index);
        let fill = if cfg.use_gradient {
            format!("url(#{})", element_id(p, "gradient", arc.index))
        } else {
            arc.color.clone()
        };
        arcs = arcs.child(
            Node::new("path")
                .with_id(&arc_id)
                .attr("d", &arc.path)
                .attr("fill", fill)
                .attr("stroke", &cfg.canvas.background)
                .attr("stroke-width", 1),
        );

        let mut element_ids = vec![arc_id];
        if let (true, Some(label)) = (show_labels, &arc.label) {
            let label_id = element_id(p, "label", arc.index);
            labels = labels
                .child(
                    Node::new("circle")
                        .attr("cx", px(label.marker.0))
                        .attr("cy", px(label.marker.1))
                        .attr("r", 3)
                        .attr("fill", &arc.color),
                )
                .child(
                    text_node(label.x, label.y, label.anchor, cfg.legend.font_size, &cfg.canvas.color, &label.text)
                        .with_id(&label_id),
                );
            element_ids.push(label_id);
        }

        out.targets.push(HoverTarget {
            index: arc.index,
            element_ids,
            traps: vec![Node::new("path").attr("d", &arc.path)],
            tooltip: single_row(&cfg.tooltip, &arc.name, &arc.color, arc.value, arc.proportion),
        });
    }

    out.nodes.push(arcs);
    out.nodes.push(labels);

    let lines = center_lines(m, cfg);
    if !lines.is_empty() {
        let first_y = m.center.1 - (lines.len() as f64 - 1.0) * 10.0;
        let texts = lines.into_iter().enumerate().map(|(i, line)| {
            text_node(
                m.center.0,
                first_y + i as f64 * 20.0,
                TextAnchor::Middle,
                cfg.legend.font_size + 2.0,
                &cfg.canvas.color,
                line,
            )
            .attr("dominant-baseline", "middle")
        });
        out.nodes.push(Node::new("g").with_id(format!("{}-center", p)).children(texts));
    }
}

// ============================================================================
// GAUGE
// ============================================================================

fn draw_gauge(m: &GaugeModel, cfg: &GaugeConfig, options: &DrawOptions<'_>, out: &mut Drawing) {
    let p = options.prefix;
    let mut arcs = Node::new("g").with_id(format!("{}-arcs", p));

    for arc in &m.arcs {
        let arc_id = element_id(p, "arc", arc.index);
        arcs = arcs.child(
            Node::new("path")
                .with_id(&arc_id)
                .attr("d", &arc.path)
                .attr("fill", &arc.color),
        );

        out.targets.push(HoverTarget {
            index: arc.index,
            element_ids: vec![arc_id],
            traps: vec![Node::new("path").attr("d", &arc.path)],
            tooltip: TooltipContent {
                title: arc.name.clone(),
                rows: vec![TooltipRow {
                    color: arc.color.clone(),
                    name: arc.name.clone(),
                    value: format!(
                        "{} - {}",
                        format_value(arc.from, cfg.rounding_value),
                        format_value(arc.to, cfg.rounding_value)
                    ),
                    percentage: None,
                }],
            },
        });
    }
    out.nodes.push(arcs);

    if options.show_labels && !m.markers.is_empty() {
        let markers = m.markers.iter().map(|marker| {
            text_node(marker.x, marker.y, marker.anchor, cfg.legend.font_size, &cfg.canvas.color, &marker.text)
        });
        out.nodes.push(Node::new("g").with_id(format!("{}-markers", p)).children(markers));
    }

    let pointer = &m.pointer;
    out.nodes.push(
        Node::new("g")
            .with_id(format!("{}-pointer", p))
            .child(
                Node::new("line")
                    .attr("x1", px(pointer.base.0))
                    .attr("y1", px(pointer.base.1))
                    .attr("x2", px(pointer.tip.0))
                    .attr("y2", px(pointer.tip.1))
                    .attr("stroke", &pointer.color)
                    .attr("stroke-width", pointer.stroke_width)
                    .attr("stroke-linecap", "round"),
            )
            .child(
                Node::new("circle")
                    .attr("cx", px(pointer.base.0))
                    .attr("cy", px(pointer.base.1))
                    .attr("r", pointer.stroke_width * 1.5)
                    .attr("fill", &pointer.color),
            ),
    );

    out.nodes.push(
        text_node(
            m.center.0,
            m.center.1 + m.area.height * 0.12,
            TextAnchor::Middle,
            cfg.title.font_size * 1.5,
            &cfg.canvas.color,
            &m.value_text,
        )
        .with_id(format!("{}-value", p)),
    );
}

// ============================================================================
// RADIAL BAR
// ============================================================================

fn draw_radial_bar(m: &RadialBarModel, cfg: &RadialBarConfig, options: &DrawOptions<'_>, out: &mut Drawing) {
    let p = options.prefix;
    let transform = m.track_transform();
    let mut rings = Node::new("g").with_id(format!("{}-rings", p));
    let mut labels = Node::new("g").with_id(format!("{}-labels", p));

    for ring in &m.rings {
        let gutter_id = element_id(p, "gutter", ring.index);
        let track_id = element_id(p, "ring", ring.index);
        let circle = || {
            Node::new("circle")
                .attr("cx", px(m.center.0))
                .attr("cy", px(m.center.1))
                .attr("r", px(ring.radius))
                .attr("fill", "none")
                .attr("stroke-width", px(ring.stroke_width))
        };

        rings = rings
            .child(circle().with_id(&gutter_id).attr("stroke", &m.gutter_color))
            .child(
                circle()
                    .with_id(&track_id)
                    .attr("stroke", &ring.color)
                    .attr("stroke-dasharray", px(ring.dasharray))
                    .attr("stroke-dashoffset", px(ring.dashoffset))
                    .attr("stroke-linecap", "round")
                    .attr("transform", &transform),
            );

        if let (true, Some(label)) = (options.show_labels, &ring.label) {
            labels = labels.child(text_node(
                label.x,
                label.y,
                label.anchor,
                cfg.legend.font_size,
                &cfg.canvas.color,
                &label.text,
            )
            .attr("dominant-baseline", "middle"));
        }

        out.targets.push(HoverTarget {
            index: ring.index,
            element_ids: vec![gutter_id, track_id],
            traps: vec![circle().attr("stroke", "transparent")],
            tooltip: single_row(&cfg.tooltip, &ring.name, &ring.color, ring.value, ring.proportion),
        });
    }

    out.nodes.push(rings);
    out.nodes.push(labels);
}

// ============================================================================
// VERTICAL BAR
// ============================================================================

fn draw_vertical_bar(m: &VerticalBarModel, cfg: &VerticalBarConfig, options: &DrawOptions<'_>, out: &mut Drawing) {
    let p = options.prefix;
    let mut bars = Node::new("g").with_id(format!("{}-bars", p));

    for (row_index, row) in m.rows.iter().enumerate() {
        let bar_id = element_id(p, "bar", row_index);
        let size = if row.is_child() { cfg.legend.font_size - 1.0 } else { cfg.legend.font_size };

        bars = bars
            .child(
                Node::new("rect")
                    .with_id(&bar_id)
                    .attr("x", px(row.x))
                    .attr("y", px(row.y))
                    .attr("width", px(row.width))
                    .attr("height", px(row.height))
                    .attr("rx", 2)
                    .attr("fill", &row.color),
            )
            .child(
                text_node(row.name_x, row.center_y(), TextAnchor::End, size, &cfg.canvas.color, &row.name)
                    .attr("dominant-baseline", "middle"),
            );

        if options.show_labels && !row.text.is_empty() {
            bars = bars.child(
                text_node(row.value_x, row.center_y(), TextAnchor::Start, size, &cfg.canvas.color, &row.text)
                    .attr("dominant-baseline", "middle"),
            );
        }

        out.targets.push(HoverTarget {
            index: row.index,
            element_ids: vec![bar_id],
            traps: vec![
                Node::new("rect")
                    .attr("x", px(m.area.left))
                    .attr("y", px(row.y))
                    .attr("width", px(m.area.width))
                    .attr("height", px(row.height)),
            ],
            tooltip: single_row(&cfg.tooltip, &row.name, &row.color, row.value, row.proportion),
        });
    }

    out.nodes.push(bars);
}

// ============================================================================
// WAFFLE
// ============================================================================

fn draw_waffle(m: &WaffleModel, cfg: &WaffleConfig, options: &DrawOptions<'_>, out: &mut Drawing) {
    let p = options.prefix;
    let cell_rect = |x: f64, y: f64, size: f64| {
        Node::new("rect")
            .attr("x", px(x))
            .attr("y", px(y))
            .attr("width", px(size))
            .attr("height", px(size))
    };

    let mut element_ids: Vec<Vec<String>> = vec![Vec::new(); m.series.len()];
    let mut traps: Vec<Vec<Node>> = vec![Vec::new(); m.series.len()];

    let cells: Vec<Node> = m
        .cells
        .iter()
        .map(|cell| {
            let id = element_id(p, "cell", cell.position);
            element_ids[cell.series].push(id.clone());
            traps[cell.series].push(cell_rect(cell.x, cell.y, cell.size));
            cell_rect(cell.x, cell.y, cell.size)
                .with_id(id)
                .attr("rx", cfg.cell_radius)
                .attr("fill", &m.series[cell.series].color)
        })
        .collect();
    out.nodes.push(Node::new("g").with_id(format!("{}-cells", p)).children(cells));

    for ((series, ids), traps) in m.series.iter().zip(element_ids).zip(traps) {
        out.targets.push(HoverTarget {
            index: series.index,
            element_ids: ids,
            traps,
            tooltip: single_row(&cfg.tooltip, &series.name, &series.color, series.value, series.proportion),
        });
    }
}

// ============================================================================
// XY
// ============================================================================

fn draw_xy(m: &XyModel, cfg: &XyConfig, options: &DrawOptions<'_>, out: &mut Drawing) {
    let p = options.prefix;
    let area = &m.area;

    if cfg.grid.show {
        let mut grid = Node::new("g").with_id(format!("{}-grid", p));
        for tick in &m.y_ticks {
            grid = grid.child(
                Node::new("line")
                    .attr("x1", px(area.left))
                    .attr("x2", px(area.right_edge()))
                    .attr("y1", px(tick.y))
                    .attr("y2", px(tick.y))
                    .attr("stroke", &cfg.grid.stroke),
            );
            if cfg.grid.show_y_labels {
                grid = grid.child(
                    text_node(tick.x, tick.y, TextAnchor::End, cfg.legend.font_size, &cfg.canvas.color, &tick.text)
                        .attr("dominant-baseline", "middle"),
                );
            }
        }
        grid = grid.child(
            Node::new("line")
                .with_id(format!("{}-zero", p))
                .attr("x1", px(area.left))
                .attr("x2", px(area.right_edge()))
                .attr("y1", px(m.zero_y))
                .attr("y2", px(m.zero_y))
                .attr("stroke", &cfg.canvas.color)
                .attr("stroke-opacity", 0.5),
        );
        out.nodes.push(grid);
    }

    if !m.x_labels.is_empty() {
        let labels = m.x_labels.iter().map(|tick| {
            text_node(tick.x, tick.y, TextAnchor::Middle, cfg.legend.font_size, &cfg.canvas.color, &tick.text)
        });
        out.nodes.push(Node::new("g").with_id(format!("{}-x-labels", p)).children(labels));
    }

    let mut slot_ids: Vec<Vec<String>> = vec![Vec::new(); m.slot_count];
    let mut plot = Node::new("g").with_id(format!("{}-series", p));

    for (rank, series) in m.series.iter().enumerate() {
        let part = |name: &str| format!("{}-s{}-{}", p, rank, name);

        if let Some(area_d) = &series.area {
            plot = plot.child(
                Node::new("path")
                    .with_id(part("area"))
                    .attr("d", area_d)
                    .attr("fill", &series.color)
                    .attr("fill-opacity", cfg.line.area_opacity),
            );
        }
        if let Some(line) = &series.line {
            plot = plot.child(
                Node::new("path")
                    .with_id(part("line"))
                    .attr("d", line)
                    .attr("fill", "none")
                    .attr("stroke", &series.color)
                    .attr("stroke-width", cfg.line.stroke_width)
                    .attr("stroke-linejoin", "round"),
            );
        }

        for bar in &series.bars {
            let id = part(&format!("bar-{}", bar.slot));
            plot = plot.child(
                Node::new("rect")
                    .with_id(&id)
                    .attr("x", px(bar.x))
                    .attr("y", px(bar.y))
                    .attr("width", px(bar.width.max(0.0)))
                    .attr("height", px(bar.height))
                    .attr("rx", cfg.bar.radius)
                    .attr("fill", &series.color),
            );
            slot_ids[bar.slot].push(id);
        }

        let point_radius = match series.kind {
            SeriesKind::Line if cfg.line.show_points => Some(cfg.line.point_radius),
            SeriesKind::Plot => Some(cfg.plot_radius),
            _ => None,
        };
        if let Some(radius) = point_radius {
            for (slot, &(x, y)) in series.points.iter().enumerate() {
                let id = part(&format!("point-{}", slot));
                plot = plot.child(
                    Node::new("circle")
                        .with_id(&id)
                        .attr("cx", px(x))
                        .attr("cy", px(y))
                        .attr("r", radius)
                        .attr("fill", &series.color),
                );
                slot_ids[slot].push(id);
            }
        }

        if options.show_labels {
            for (label, &(x, y)) in series.data_labels.iter().zip(&series.points) {
                plot = plot.child(text_node(
                    x,
                    y - 8.0,
                    TextAnchor::Middle,
                    cfg.legend.font_size - 2.0,
                    &cfg.canvas.color,
                    label,
                ));
            }
        }

        if let Some(progression) = &series.progression {
            plot = plot
                .child(
                    Node::new("line")
                        .with_id(part("trend"))
                        .attr("x1", px(progression.start.0))
                        .attr("y1", px(progression.start.1))
                        .attr("x2", px(progression.end.0))
                        .attr("y2", px(progression.end.1))
                        .attr("stroke", &series.color)
                        .attr("stroke-width", cfg.progression.stroke_width)
                        .attr("stroke-dasharray", cfg.progression.dasharray)
                        .attr("marker-end", format!("url(#{}-arrow)", p)),
                )
                .child(text_node(
                    progression.end.0,
                    progression.end.1 - 8.0,
                    TextAnchor::End,
                    cfg.legend.font_size - 2.0,
                    &series.color,
                    &progression.label,
                ));
        }
    }

    if m.series.iter().any(|s| s.progression.is_some()) {
        out.nodes.push(
            Node::new("defs").with_id(format!("{}-defs", p)).child(
                Node::new("marker")
                    .with_id(format!("{}-arrow", p))
                    .attr("viewBox", "0 0 10 10")
                    .attr("refX", 9)
                    .attr("refY", 5)
                    .attr("markerWidth", 6)
                    .attr("markerHeight", 6)
                    .attr("orient", "auto")
                    .child(Node::new("path").attr("d", "M0,0L10,5L0,10Z").attr("fill", "context-stroke")),
            ),
        );
    }
    out.nodes.push(plot);

    for (slot, ids) in slot_ids.into_iter().enumerate() {
        let title = cfg
            .x_labels
            .get(slot)
            .cloned()
            .unwrap_or_else(|| format!("#{}", slot + 1));
        let rows = m
            .series
            .iter()
            .filter_map(|series| {
                let value = *series.values.get(slot)?;
                Some(TooltipRow {
                    color: series.color.clone(),
                    name: series.name.clone(),
                    value: format_value(value, cfg.tooltip.rounding_value),
                    percentage: None,
                })
            })
            .collect();

        out.targets.push(HoverTarget {
            index: slot,
            element_ids: ids,
            traps: vec![
                Node::new("rect")
                    .attr("x", px(area.left + m.slot_width * slot as f64))
                    .attr("y", px(area.top))
                    .attr("width", px(m.slot_width))
                    .attr("height", px(area.height.max(0.0))),
            ],
            tooltip: TooltipContent { title, rows },
        });
    }
}
