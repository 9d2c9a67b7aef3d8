//! Plain-text dashboard rendering for the terminal.

use skycast_core::error::{UNEXPECTED_HEADLINE, UNEXPECTED_HINT};
use skycast_core::{UiConfig, ViewPhase};
use skycast_weather::{AqiLevel, ConditionIcon, EntrySource, TimelineEntry, WeatherPayload};
use std::fmt::Write;

use crate::controller::DashboardState;

/// ANSI SGR code for a color token; unknown tokens render uncolored
fn ansi_code(token: &str) -> Option<&'static str> {
    Some(match token {
        "black" => "30",
        "red" => "31",
        "green" => "32",
        "yellow" => "33",
        "blue" => "34",
        "magenta" => "35",
        "cyan" => "36",
        "white" => "37",
        "gray" | "bright_black" => "90",
        "orange" | "bright_yellow" => "93",
        "bright_blue" => "94",
        "bright_magenta" => "95",
        "bright_cyan" => "96",
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
    show_air_quality: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            color: false,
            show_air_quality: true,
        }
    }
}

impl From<&UiConfig> for Renderer {
    fn from(ui: &UiConfig) -> Self {
        Self {
            color: ui.color,
            show_air_quality: ui.show_air_quality,
        }
    }
}

impl Renderer {
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, text: &str, token: &str) -> String {
        match (self.color, ansi_code(token)) {
            (true, Some(code)) => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    pub fn render(&self, state: &DashboardState) -> String {
        let mut out = String::new();

        match state.phase {
            ViewPhase::Loading => {
                let _ = writeln!(out, "Loading weather...");
            }
            ViewPhase::Error(kind) => {
                let (headline, hint) = kind
                    .map(|k| (k.headline(), k.hint()))
                    .unwrap_or((UNEXPECTED_HEADLINE, UNEXPECTED_HINT));
                let _ = writeln!(out, "{}", self.paint(&format!("✖ {}", headline), "red"));
                let _ = writeln!(out, "  {}", hint);
                if let Some(detail) = &state.error_message {
                    let _ = writeln!(out, "  ({})", detail);
                }
                let _ = writeln!(out);
                let _ = writeln!(out, "  :retry  try again    :home  back to default city");
            }
            ViewPhase::Ready => {
                if let Some(notice) = &state.notice {
                    let _ = writeln!(out, "{}", self.paint(&format!("! {}", notice), "yellow"));
                }
                if let Some(payload) = &state.payload {
                    self.render_payload(&mut out, state, payload);
                }
                self.render_timeline(&mut out, &state.timeline);
            }
        }

        out
    }

    fn render_payload(&self, out: &mut String, state: &DashboardState, payload: &WeatherPayload) {
        let location = &payload.location;
        let current = &payload.current;
        let theme = &state.theme;

        let place = [&location.name, &location.region, &location.country]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(
            out,
            "{}  {}",
            theme.emoji,
            self.bold(&self.paint(&place, theme.accent))
        );
        let _ = writeln!(out, "   Local time {}", location.local_time);
        let _ = writeln!(
            out,
            "   {}  {:.1}°C (feels like {:.1}°C)",
            current.condition.text, current.temperature, current.feels_like
        );
        let _ = writeln!(
            out,
            "   Wind {:.1} km/h {} (gusts {:.1})  Humidity {}%  Cloud {}%",
            current.wind_kph, current.wind_direction, current.gust_kph, current.humidity,
            current.cloud_cover
        );
        let _ = writeln!(
            out,
            "   Visibility {:.1} km  Pressure {:.0} mb  UV {:.0}",
            current.visibility_km, current.pressure_mb, current.uv_index
        );

        if let Some(today) = payload.today() {
            let _ = writeln!(
                out,
                "   Sunrise {}  Sunset {}  Moonrise {}  Moonset {}",
                today.astro.sunrise, today.astro.sunset, today.astro.moonrise, today.astro.moonset
            );
        }

        if self.show_air_quality {
            let aq = &current.air_quality;
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.bold("Air quality"));
            for (label, value) in [("PM2.5", aq.pm2_5), ("PM10", aq.pm10)] {
                let level = AqiLevel::from_reading(value);
                let _ = writeln!(
                    out,
                    "   {:<6}{:>7.1}  {}",
                    label,
                    value,
                    self.paint(level.label(), level.color())
                );
            }
            let _ = writeln!(
                out,
                "   CO {:.1}  NO2 {:.1}  SO2 {:.1}  O3 {:.1}",
                aq.co, aq.no2, aq.so2, aq.o3
            );
        }

        if !payload.alerts.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.paint("Alerts", "red"));
            for alert in &payload.alerts {
                let _ = writeln!(out, "   {} ({})", alert.headline, alert.severity);
            }
        }
    }

    fn render_timeline(&self, out: &mut String, timeline: &[TimelineEntry]) {
        if timeline.is_empty() {
            return;
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.bold("Timeline"));
        for entry in timeline {
            let icon = ConditionIcon::from_text(&entry.day.condition.text);
            let marker = match (entry.is_today, entry.source) {
                (true, _) => self.paint("◀ today", "bright_blue"),
                (false, EntrySource::History) => self.paint("past", "gray"),
                (false, EntrySource::Forecast) => String::new(),
            };
            let _ = writeln!(
                out,
                "   {}  {} {:<24} {:>5.1}° / {:>5.1}°  rain {:>3}%  {}",
                entry.display_date(),
                icon.glyph(),
                entry.day.condition.text,
                entry.day.max_temp,
                entry.day.min_temp,
                entry.day.chance_of_rain,
                marker
            );
        }
    }
}
