use crate::config::DashboardConfig;
use crate::labels::LabelLocale;

pub fn render_index(config: &DashboardConfig) -> String {
    let locale = config.locale;
    let (lang, heading, refresh, loading, failed) = match locale {
        LabelLocale::Russian => (
            "ru",
            "Аналитика публикаций",
            "Обновить",
            "Загрузка...",
            "Не удалось загрузить данные",
        ),
        LabelLocale::English => (
            "en",
            "Publication analytics",
            "Refresh",
            "Loading...",
            "Failed to load data",
        ),
    };

    INDEX_HTML
        .replace("{{LANG}}", lang)
        .replace("{{HEADING}}", heading)
        .replace("{{REFRESH}}", refresh)
        .replace("{{LOADING}}", loading)
        .replace("{{FAILED}}", failed)
        .replace("{{FROM}}", &config.default_range.from.format("%Y-%m-%d").to_string())
        .replace("{{TO}}", &config.default_range.to.format("%Y-%m-%d").to_string())
        .replace("{{TIMELINE_TITLE}}", locale.publications())
        .replace("{{SOURCES_TITLE}}", locale.sources())
        .replace("{{SENTIMENT_TITLE}}", locale.sentiment())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="{{LANG}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{HEADING}}</title>
  <style>
    :root {
      --bg: #f4f6fa;
      --ink: #333;
      --muted: #6b7280;
      --card: #fff;
      --accent: #4285f4;
      --shadow: 0 18px 40px rgba(30, 41, 59, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: end;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
    }

    .range {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .range input {
      border: 1px solid #d1d5db;
      border-radius: 10px;
      padding: 8px 10px;
      font: inherit;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      color: white;
      background: var(--accent);
      cursor: pointer;
    }

    button:disabled {
      opacity: 0.6;
      cursor: progress;
    }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 20px;
    }

    .chart-card {
      background: var(--card);
      border-radius: 18px;
      padding: 18px;
      box-shadow: var(--shadow);
      display: grid;
      gap: 12px;
    }

    .chart-card h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    .chart-card svg {
      width: 100%;
      display: block;
    }

    .bar-label {
      fill: var(--ink);
      font-size: 14px;
      font-weight: 700;
    }

    .bar-empty {
      fill: var(--muted);
      font-size: 13px;
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{HEADING}}</h1>
      <form class="range" id="range-form">
        <input type="date" id="from" value="{{FROM}}" required />
        <input type="date" id="to" value="{{TO}}" required />
        <button type="submit" id="refresh-btn">{{REFRESH}}</button>
      </form>
    </header>

    <section class="charts">
      <div class="chart-card">
        <h2>{{TIMELINE_TITLE}}</h2>
        <svg id="timeline-chart" role="img" aria-label="{{TIMELINE_TITLE}}"></svg>
      </div>
      <div class="chart-card">
        <h2>{{SOURCES_TITLE}}</h2>
        <svg id="sources-chart" role="img" aria-label="{{SOURCES_TITLE}}"></svg>
      </div>
      <div class="chart-card">
        <h2>{{SENTIMENT_TITLE}}</h2>
        <svg id="sentiment-chart" role="img" aria-label="{{SENTIMENT_TITLE}}"></svg>
      </div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const fromEl = document.getElementById('from');
    const toEl = document.getElementById('to');
    const buttonEl = document.getElementById('refresh-btn');
    const statusEl = document.getElementById('status');
    const chartEls = {
      timeline: document.getElementById('timeline-chart'),
      sources: document.getElementById('sources-chart'),
      sentiment: document.getElementById('sentiment-chart')
    };

    let loading = false;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeText = (value) =>
      String(value).replace(/[&<>"]/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;' }[c]));

    const renderBars = (svg, chart) => {
      const width = 480;
      const rowHeight = 34;
      if (!chart || !chart.values.length) {
        svg.setAttribute('viewBox', `0 0 ${width} 60`);
        svg.innerHTML = '<text class="bar-empty" x="50%" y="50%" text-anchor="middle">—</text>';
        return;
      }

      const height = chart.values.length * rowHeight + 8;
      const max = chart.unit === '%' ? 100 : Math.max(...chart.values, 1);
      const labelWidth = 170;
      const barSpace = width - labelWidth - 8;

      const rows = chart.values.map((value, index) => {
        const y = index * rowHeight + 4;
        const barWidth = Math.max((value / max) * barSpace, 2);
        const suffix = chart.unit ? ` ${value}${chart.unit}` : '';
        return `
          <text class="bar-label" x="0" y="${y + 21}">${escapeText(chart.labels[index] + suffix)}</text>
          <rect x="${width - barWidth}" y="${y + 4}" width="${barWidth}" height="${rowHeight - 10}" rx="4" fill="${chart.colors[index]}" />
        `;
      });

      svg.setAttribute('viewBox', `0 0 ${width} ${height}`);
      svg.innerHTML = rows.join('');
    };

    const renderSnapshot = (snapshot) => {
      Object.entries(chartEls).forEach(([kind, svg]) => {
        const widget = snapshot.charts[kind];
        renderBars(svg, widget ? widget.chart : null);
      });
    };

    const refresh = async () => {
      if (loading) {
        return;
      }
      loading = true;
      buttonEl.disabled = true;
      setStatus('{{LOADING}}', 'info');
      try {
        const res = await fetch('/api/dashboard/refresh', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ from: fromEl.value, to: toEl.value })
        });
        if (!res.ok) {
          throw new Error(await res.text());
        }
        renderSnapshot(await res.json());
        setStatus('', '');
      } catch (err) {
        setStatus(`{{FAILED}}: ${err.message}`, 'error');
      } finally {
        loading = false;
        buttonEl.disabled = false;
      }
    };

    document.getElementById('range-form').addEventListener('submit', (event) => {
      event.preventDefault();
      refresh();
    });

    refresh();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_carries_default_range_and_titles() {
        let config = DashboardConfig::from_lookup(|_| None).unwrap();
        let page = render_index(&config);
        assert!(page.contains(r#"value="2025-06-01""#));
        assert!(page.contains(r#"value="2025-06-07""#));
        assert!(page.contains("Тональность"));
        assert!(!page.contains("{{"));
    }
}
