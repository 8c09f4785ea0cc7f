use serde_json::Value;
use std::io;

/// Write output as CSV to stdout. Schedules and plan summaries come out
/// as row-per-period tables; scalar results as field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                write_result_csv(&mut wtr, result);
            } else {
                write_flat_csv(&mut wtr, map);
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_result_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, result: &Value) {
    // Unwrap single-variant outcome enums.
    let inner = match result {
        Value::Object(map) if map.len() == 1 => {
            map.values().next().filter(|v| v.is_object()).unwrap_or(result)
        }
        _ => result,
    };

    match inner {
        Value::Object(map) => {
            // Prefer the embedded schedule when present: rows are more
            // useful in CSV than the totals.
            if let Some(Value::Array(rows)) = map
                .values()
                .find(|v| matches!(v, Value::Array(a) if a.first().map(Value::is_object).unwrap_or(false)))
            {
                write_array_csv(wtr, rows);
            } else {
                write_flat_csv(wtr, map);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(inner)]);
        }
    }
}

fn write_flat_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
