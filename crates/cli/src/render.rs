use kernel::{
    TestResult,
    control::EndpointView,
    domain::{EndpointKey, PresetChoice},
    runtime::Interception,
};
use std::io::{self, Write};

pub fn endpoints(out: &mut impl Write, views: &[EndpointView], active: usize) -> io::Result<()> {
    writeln!(out, "Mock Manager (active: {active})")?;
    if views.is_empty() {
        writeln!(out, "  no endpoints registered")?;
        return Ok(());
    }
    let width = views
        .iter()
        .map(|view| view.key.path.len())
        .max()
        .unwrap_or(0);

    for view in views {
        let presets = view
            .presets
            .iter()
            .map(|preset| format!("{} ({})", preset.label, preset.status))
            .collect::<Vec<_>>()
            .join(", ");
        let marker = match &view.current {
            PresetChoice::RealApi => ' ',
            PresetChoice::Preset(_) => '*',
        };
        writeln!(
            out,
            "{marker} {:<7} {:<width$}  {:<12}  [{presets}]",
            view.key.method.as_str(),
            view.key.path,
            view.current.as_str(),
        )?;
    }
    Ok(())
}

pub fn profiles(out: &mut impl Write, names: &[String], current: Option<&str>) -> io::Result<()> {
    if names.is_empty() {
        writeln!(out, "no profiles defined")?;
    }
    for name in names {
        let marker = if Some(name.as_str()) == current { '*' } else { ' ' };
        writeln!(out, "{marker} {name}")?;
    }
    Ok(())
}

pub fn interception(
    out: &mut impl Write,
    key: &EndpointKey,
    interception: &Interception,
) -> io::Result<()> {
    match interception {
        Interception::PassThrough => writeln!(out, "{key}: real-api (pass-through)"),
        Interception::Mocked(response) => {
            writeln!(out, "{key}: {} ({})", response.preset, response.status)?;
            writeln!(out, "{}", pretty(&response.body))
        }
    }
}

pub fn test_results(out: &mut impl Write, results: &[(EndpointKey, TestResult)]) -> io::Result<()> {
    for (key, result) in results {
        match result {
            TestResult::Success {
                status,
                data,
                preset,
            } => {
                let source = preset.as_deref().unwrap_or("network");
                writeln!(out, "{key}: Success ({status}) via {source}")?;
                writeln!(out, "{}", pretty(data))?;
            }
            TestResult::Failed { error } => {
                writeln!(out, "{key}: Failed")?;
                writeln!(out, "{error}")?;
            }
        }
    }
    Ok(())
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::{
        control::PresetSummary,
        domain::HttpMethod,
        runtime::MockResponse,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn endpoint_rows_mark_active_presets() {
        let views = vec![
            EndpointView {
                key: EndpointKey::new(HttpMethod::Get, "/api/user"),
                presets: vec![
                    PresetSummary { label: "success".into(), status: 200 },
                    PresetSummary { label: "error".into(), status: 404 },
                ],
                current: PresetChoice::Preset("error".into()),
            },
            EndpointView {
                key: EndpointKey::new(HttpMethod::Post, "/api/loans"),
                presets: vec![PresetSummary { label: "approved".into(), status: 201 }],
                current: PresetChoice::RealApi,
            },
        ];
        let text = render(|out| endpoints(out, &views, 1));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Mock Manager (active: 1)");
        assert!(lines[1].starts_with("* GET     /api/user "));
        assert!(lines[1].contains("error"));
        assert!(lines[1].ends_with("[success (200), error (404)]"));
        assert!(lines[2].starts_with("  POST    /api/loans"));
        assert!(lines[2].contains("real-api"));
    }

    #[test]
    fn profiles_mark_current() {
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(render(|out| profiles(out, &names, Some("b"))), "  a\n* b\n");
    }

    #[test]
    fn mocked_interception_prints_body() {
        let key = EndpointKey::new(HttpMethod::Get, "/api/user");
        let mocked = Interception::Mocked(MockResponse {
            status: 404,
            preset: "error".into(),
            body: json!({ "error": "User not found" }),
        });
        let text = render(|out| interception(out, &key, &mocked));
        assert!(text.starts_with("GET /api/user: error (404)\n"));
        assert!(text.contains("\"error\": \"User not found\""));

        let text = render(|out| interception(out, &key, &Interception::PassThrough));
        assert_eq!(text, "GET /api/user: real-api (pass-through)\n");
    }
}
