//! Stopwatch page rendering

use crate::state::StopwatchSnapshot;

/// Path the page links its stylesheet from
pub const STYLESHEET_PATH: &str = "/stopwatch.css";

// Buttons POST their action; the heading follows the `/events` stream.
const PAGE_SCRIPT: &str = r#"
const display = document.querySelector(".time-display");
for (const action of ["start", "stop", "reset"]) {
  document.querySelector(".button." + action)
    .addEventListener("click", () => fetch("/" + action, { method: "POST" }));
}
const events = new EventSource("/events");
events.addEventListener("display", (event) => {
  display.textContent = JSON.parse(event.data).display;
});
"#;

/// Render the stopwatch page for the given snapshot
pub fn render_page(snapshot: &StopwatchSnapshot) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Stopwatch</title>
<link rel="stylesheet" href="{stylesheet}">
</head>
<body>
<div class="app" data-phase="{phase}">
  <h1 class="time-display">{display}</h1>
  <div class="buttons-container">
    <button class="button start">Start</button>
    <button class="button stop">Stop</button>
    <button class="button reset">Reset</button>
  </div>
</div>
<script>{script}</script>
</body>
</html>
"#,
        stylesheet = STYLESHEET_PATH,
        phase = snapshot.phase.as_str(),
        display = snapshot.display,
        script = PAGE_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StopwatchState, TimeState};

    #[test]
    fn page_has_heading_and_buttons() {
        let mut stopwatch = StopwatchState::new();
        stopwatch.time = TimeState { hours: 0, minutes: 2, seconds: 9 };
        let html = render_page(&stopwatch.snapshot());

        assert!(html.contains(r#"<h1 class="time-display">00:02:09</h1>"#));
        assert!(html.contains(r#"<button class="button start">Start</button>"#));
        assert!(html.contains(r#"<button class="button stop">Stop</button>"#));
        assert!(html.contains(r#"<button class="button reset">Reset</button>"#));
        assert!(html.contains(r#"class="buttons-container""#));
        assert!(html.contains(r#"href="/stopwatch.css""#));
    }

    #[test]
    fn page_reports_phase() {
        let mut stopwatch = StopwatchState::new();
        stopwatch.start();
        assert!(render_page(&stopwatch.snapshot()).contains(r#"data-phase="running""#));
    }
}
