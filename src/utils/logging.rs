use console::style;
use std::fmt::{self as std_fmt, Debug};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

struct CleanFormatter {
    show_timestamps: bool,
    use_color: bool,
}

impl CleanFormatter {
    fn new(show_timestamps: bool, use_color: bool) -> Self {
        Self {
            show_timestamps,
            use_color,
        }
    }

    fn format_level(&self, level: &Level) -> String {
        if !self.use_color {
            match *level {
                Level::ERROR => "ERROR ".to_string(),
                Level::WARN => "WARN  ".to_string(),
                Level::INFO => "".to_string(), // Hide INFO prefix for cleaner output
                Level::DEBUG => "DEBUG ".to_string(),
                Level::TRACE => "TRACE ".to_string(),
            }
        } else {
            match *level {
                Level::ERROR => format!("{} ", style("ERROR").red().bold()),
                Level::WARN => format!("{} ", style("WARN ").yellow()),
                Level::INFO => "".to_string(),
                Level::DEBUG => format!("{} ", style("DEBUG").blue()),
                Level::TRACE => format!("{} ", style("TRACE").magenta()),
            }
        }
    }
}

impl<S, N> FormatEvent<S, N> for CleanFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std_fmt::Result {
        let metadata = event.metadata();
        let message = {
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);
            visitor.message
        };

        let mut output = String::new();

        if self.show_timestamps {
            let now = chrono::Utc::now();
            let timestamp = if self.use_color {
                style(now.format("%H:%M:%S").to_string()).dim().to_string()
            } else {
                now.format("%H:%M:%S").to_string()
            };
            output.push_str(&format!("[{}] ", timestamp));
        }

        output.push_str(&self.format_level(metadata.level()));
        output.push_str(&message);

        writeln!(writer, "{}", output)
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value).trim_matches('"').to_string();
        }
    }
}

pub fn setup_logging(
    level: &str,
    show_timestamps: bool,
    colored: bool,
) -> crate::utils::Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let formatter = CleanFormatter::new(show_timestamps, colored);
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(false) // Level rendering is handled by the formatter
        .event_format(formatter);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
