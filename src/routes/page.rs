//! Static dashboard page. All data comes from `/api/dashboard`.

use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

// ---

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(page))
}

async fn page() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Html(DASHBOARD_HTML),
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sensor Dashboard</title>
    <style>
        :root { --bg: #f8fafc; --surface: #fff; --border: #e2e8f0; --text: #1e293b; --muted: #64748b; }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); }
        .layout { display: flex; gap: 1rem; padding: 1.5rem; }
        main { flex: 1; }
        aside { width: 320px; background: var(--surface); border: 1px solid var(--border); border-radius: .5rem; padding: 1rem; align-self: flex-start; }
        h1 { font-size: 1.25rem; margin-bottom: 1rem; }
        h2 { font-size: 1rem; margin: 1.25rem 0 .5rem; }
        .badge { background: #dc2626; color: #fff; border-radius: 999px; padding: 0 .5rem; font-size: .8rem; }
        .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(150px, 1fr)); gap: .5rem; }
        .card { background: var(--surface); border: 1px solid var(--border); border-left: 4px solid; border-radius: .375rem; padding: .5rem .75rem; }
        .card .label { color: var(--muted); font-size: .8rem; }
        .card .value { font-size: 1.4rem; font-weight: 600; }
        .red { border-color: #dc2626; } .amber { border-color: #d97706; } .blue { border-color: #2563eb; } .green { border-color: #16a34a; }
        .charts { display: grid; grid-template-columns: 1fr 1fr; gap: .5rem; margin-top: .5rem; }
        svg { background: var(--surface); border: 1px solid var(--border); border-radius: .375rem; width: 100%; height: 140px; }
        .warning { border-bottom: 1px solid var(--border); padding: .4rem 0; font-size: .85rem; }
        .warning small { color: var(--muted); display: block; }
        .screen { padding: 4rem; text-align: center; color: var(--muted); }
        .screen.error { color: #dc2626; }
    </style>
</head>
<body>
<div id="root"><div class="screen">Loading sensor data…</div></div>
<script>
const root = document.getElementById('root');

function esc(value) {
    return String(value ?? '')
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;')
        .replace(/'/g, '&#39;');
}

function chart(series) {
    const w = 400, h = 140, pad = 8;
    const pts = series.points;
    if (pts.length === 0) return '<svg></svg>';
    const values = pts.map(p => p.value).concat([series.threshold]);
    const min = Math.min(...values), max = Math.max(...values), span = (max - min) || 1;
    const x = i => pad + (pts.length === 1 ? 0 : i * (w - 2 * pad) / (pts.length - 1));
    const y = v => h - pad - (v - min) * (h - 2 * pad) / span;
    const line = pts.map((p, i) => `${x(i)},${y(p.value)}`).join(' ');
    const ty = y(series.threshold);
    return `<svg viewBox="0 0 ${w} ${h}" preserveAspectRatio="none">
        <line x1="${pad}" x2="${w - pad}" y1="${ty}" y2="${ty}" stroke="#dc2626" stroke-dasharray="4 4"/>
        <polyline points="${line}" fill="none" stroke="#2563eb" stroke-width="2"/>
        <text x="${pad}" y="14" font-size="12" fill="#64748b">${esc(series.metric)}</text>
    </svg>`;
}

function render(view) {
    if (view.error) {
        root.innerHTML = `<div class="screen error">${esc(view.error)}</div>`;
        return;
    }
    if (view.loading) return;
    const sensors = view.sensors.map(s => `
        <h2>${esc(s.sensor_id)}</h2>
        <div class="cards">${s.cards.map(c => `
            <div class="card ${esc(c.color)}">
                <div class="label">${esc(c.label)}</div>
                <div class="value">${c.value.toFixed(1)} <small>${esc(c.unit)}</small></div>
            </div>`).join('')}
        </div>
        <div class="charts">${s.charts.map(chart).join('')}</div>`).join('');
    const warnings = view.warnings.map(w => `
        <div class="warning">${esc(w.message)}<small>${esc(w.sensorId)} · ${esc(new Date(w.timestamp).toLocaleTimeString())}</small></div>`).join('');
    root.innerHTML = `<div class="layout">
        <main><h1>Environmental Sensors</h1>${sensors}</main>
        <aside><h2>Warnings <span class="badge">${view.warning_count}</span></h2>${warnings || '<small>No active warnings</small>'}</aside>
    </div>`;
}

async function refresh() {
    try {
        const res = await fetch('/api/dashboard', { headers: { Accept: 'application/json' } });
        render(await res.json());
    } catch (e) {
        render({ error: 'Dashboard service unreachable', loading: false });
    }
}

refresh();
setInterval(refresh, 5000);
</script>
</body>
</html>
"##;
