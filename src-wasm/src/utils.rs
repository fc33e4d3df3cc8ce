use chrono::{DateTime, NaiveDate, Utc};
use drop_sheet_engine::Clock;
use serde::Serialize;
use wasm_bindgen::JsValue;

pub fn set_panic_hook() {
    // Panics show up in the browser console with a stack trace
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Clock backed by the browser's `Date`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }

    /// The user's local calendar date, not the UTC one
    fn today(&self) -> NaiveDate {
        let now = js_sys::Date::new_0();
        NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
            .unwrap_or_else(|| self.now().date_naive())
    }
}

/// Serialize with `null` for `None` so the UI sees the same shape it persists
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize result: {}", e)))
}
