//! Static HTML report generation from a metrics bundle.

use twolyp_hub::ReportData;
use std::io::Write;
use std::path::Path;

/// Render a static HTML report to `out_path`. Embeds the full report JSON for verification.
pub fn render_report(data: &ReportData, out_path: impl AsRef<Path>) -> Result<(), ReportError> {
    let html = build_html(data)?;
    let mut f = std::fs::File::create(out_path.as_ref()).map_err(ReportError::Io)?;
    f.write_all(html.as_bytes()).map_err(ReportError::Io)?;
    Ok(())
}

/// Build HTML string from report data (for testing or in-memory use).
pub fn build_html(data: &ReportData) -> Result<String, ReportError> {
    let json_embed = serde_json::to_string(&data).map_err(ReportError::Json)?;
    let json_escaped = escape_json_in_html(&json_embed);
    let contract_escaped = escape_html(&data.bundle.contract);
    let hash_escaped = escape_html(&data.reproducibility_hash_sha256);

    let m = &data.bundle.metrics;
    let supply = &m.supply;
    let dist = &m.distribution;
    let vest = &m.vesting;
    let holders = &m.holders;
    let health = &m.health;
    let growth = &m.growth;

    let category_rows: String = dist
        .categories
        .iter()
        .map(|c| {
            format!(
                "<span class=\"label\">{}</span><span>{:.0} ({:.1}%)</span>\n",
                escape_html(&c.name),
                c.value,
                c.percentage
            )
        })
        .collect();

    let holder_rows: String = holders
        .categories
        .iter()
        .map(|c| {
            format!(
                "<span class=\"label\">{}</span><span>{} holders, {:.1}% of supply{}</span>\n",
                escape_html(&c.name),
                c.count,
                c.percentage_of_supply,
                if c.estimated { " (estimated)" } else { "" }
            )
        })
        .collect();

    let tranche_rows: String = vest
        .tranches
        .iter()
        .map(|t| {
            format!(
                "<span class=\"label\">{}</span><span>{:.0} vested of {:.0} ({:.1}%)</span>\n",
                escape_html(&t.name),
                t.vested,
                t.allocated,
                t.progress_pct
            )
        })
        .collect();

    let score_rows: String = [
        ("Security", &health.security),
        ("Governance", &health.governance),
        ("Network", &health.network),
        ("Ecosystem", &health.ecosystem),
        ("Overall", &health.overall),
    ]
    .iter()
    .map(|(name, s)| {
        format!(
            "<span class=\"label\">{}</span><span>{} / 100 ({})</span>\n",
            name,
            s.score,
            escape_html(&s.label)
        )
    })
    .collect();

    let integrity_note = if supply.supply_integrity_ok {
        String::new()
    } else {
        "<p class=\"alert\">Supply integrity check failed: total exceeds max.</p>".to_string()
    };
    let circulating_note = if dist.circulating_negative {
        "<p class=\"alert\">Designated wallets exceed total supply; circulating is negative.</p>"
            .to_string()
    } else {
        String::new()
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8"/>
<meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>2LYP Hub Metrics – {contract}</title>
<style>
:root {{ font-family: system-ui, sans-serif; background: #0f1419; color: #e6edf3; }}
body {{ max-width: 720px; margin: 0 auto; padding: 1.5rem; }}
h1 {{ font-size: 1.4rem; margin-bottom: 0.5rem; }}
h2 {{ font-size: 1.1rem; margin-top: 1.5rem; color: #8b949e; }}
.mono {{ font-family: ui-monospace, monospace; font-size: 0.9em; word-break: break-all; }}
.card {{ background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 1rem; margin: 0.5rem 0; }}
.grid {{ display: grid; grid-template-columns: auto 1fr; gap: 0.25rem 1rem; }}
.label {{ color: #8b949e; }}
.hash {{ font-size: 0.85em; }}
.alert {{ color: #f85149; }}
.footer {{ margin-top: 2rem; font-size: 0.85rem; color: #8b949e; }}
</style>
</head>
<body>
<h1>2LYP Hub Metrics Report</h1>
<p class="mono">{contract}</p>
<p>Generated: {created}</p>

<h2>Reproducibility</h2>
<div class="card">
  <div class="mono hash">SHA-256: {hash}</div>
  <p class="footer">Anyone can verify this report by re-running <code>twolyp-hub verify --bundle &lt;file&gt;</code> and comparing the hash.</p>
</div>

<h2>Supply</h2>
<div class="card">
  <div class="grid">
    <span class="label">Total supply</span><span>{total:.0}</span>
    <span class="label">Max supply</span><span>{max:.0}</span>
    <span class="label">Remaining mintable</span><span>{remaining:.0}</span>
    <span class="label">Utilization</span><span>{utilization:.2}%</span>
  </div>
  {integrity_note}
</div>

<h2>Distribution</h2>
<div class="card">
  <div class="grid">
{category_rows}  </div>
  {circulating_note}
</div>

<h2>Health</h2>
<div class="card">
  <div class="grid">
{score_rows}    <span class="label">Avg block time</span><span>{avg_block:.0} ms</span>
  </div>
</div>

<h2>Holders</h2>
<div class="card">
  <div class="grid">
{holder_rows}    <span class="label">Concentration index (HHI)</span><span>{hhi:.0}</span>
    <span class="label">Liquidity score</span><span>{liquidity} / 100</span>
    <span class="label">Estimated holders</span><span>{est_holders}</span>
  </div>
</div>

<h2>Vesting</h2>
<div class="card">
  <div class="grid">
    <span class="label">Allocated</span><span>{allocated:.0}</span>
    <span class="label">Vested</span><span>{vested:.0} ({progress:.1}%)</span>
    <span class="label">Remaining</span><span>{vest_remaining:.0}</span>
    <span class="label">Schedules</span><span>{vesting_count}</span>
{tranche_rows}  </div>
</div>

<h2>Growth</h2>
<div class="card">
  <div class="grid">
    <span class="label">24h rate</span><span>{rate_24h:.2}%</span>
    <span class="label">7d rate</span><span>{rate_7d:.2}%</span>
    <span class="label">Velocity</span><span>{velocity:.0} tokens/sample</span>
    <span class="label">Momentum</span><span>{momentum}</span>
    <span class="label">Volatility</span><span>{volatility:.2}</span>
    <span class="label">Trend</span><span>{trend_dir} ({trend_strength})</span>
    <span class="label">History samples</span><span>{samples}</span>
  </div>
</div>

<h2>Metrics bundle (embedded)</h2>
<div class="card">
  <p class="footer">The full metrics bundle is embedded below for verification. Do not edit.</p>
  <script type="application/json" id="metrics-bundle">{json_embed}</script>
</div>

<div class="footer">
  <p>Read-only tool; no keys; no signing.</p>
</div>
</body>
</html>"#,
        contract = contract_escaped,
        created = escape_html(&data.bundle.created_utc_rfc3339),
        hash = hash_escaped,
        total = supply.total,
        max = supply.max,
        remaining = supply.remaining,
        utilization = supply.utilization_pct,
        integrity_note = integrity_note,
        category_rows = category_rows,
        circulating_note = circulating_note,
        score_rows = score_rows,
        avg_block = health.avg_block_time_ms,
        holder_rows = holder_rows,
        hhi = holders.concentration_index,
        liquidity = holders.liquidity_score,
        est_holders = holders.estimated_holders,
        allocated = vest.total_allocated,
        vested = vest.total_vested,
        progress = vest.progress_pct,
        vest_remaining = vest.total_remaining,
        vesting_count = vest.vesting_count,
        tranche_rows = tranche_rows,
        rate_24h = growth.rates.last_24h,
        rate_7d = growth.rates.last_7d,
        velocity = growth.velocity,
        momentum = escape_html(&growth.momentum.strength),
        volatility = growth.volatility,
        trend_dir = escape_html(&growth.trend.direction),
        trend_strength = escape_html(&growth.trend.strength),
        samples = growth.sample_count,
        json_embed = json_escaped,
    );
    Ok(html)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_json_in_html(s: &str) -> String {
    escape_html(s)
}

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "io: {}", e),
            ReportError::Json(e) => write!(f, "json: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}
