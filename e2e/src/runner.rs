//! Runs a scenario table in real browsers through Playwright.

use crate::{
    config::{BrowserType, HarnessConfig},
    fixture::FixtureServer,
    outcome::{
        catch_panics, summarize, ErrorList, FailedToInitialize, FailedToOpenPage, ScenarioResult,
    },
    scenario::run_scenario,
};
use futures::{stream, FutureExt, StreamExt};
use playwright::Playwright;
use std::{path::Path, time::Duration};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};
use translit_common::ScenarioTable;

/// How long `cargo run` gets to build and bind the fixture site.
const FIXTURE_STARTUP: Duration = Duration::from_secs(300);

/// Runs every scenario in every configured browser, prints a summary and exits
/// the process with a non-zero code on any failure.
pub fn e2e_test_runner(config: HarnessConfig, table: ScenarioTable) {
    let runtime = Runtime::new().expect("failed to build the tokio runtime");
    let exit_code = runtime.block_on(async {
        let fixture = if config.spawn_fixture {
            let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
            match FixtureServer::start(&workspace, &config.base_url, FIXTURE_STARTUP).await {
                Ok(server) => Some(server),
                Err(err) => {
                    error!(%err, "fixture site failed to start");
                    return 1;
                }
            }
        } else {
            None
        };

        let exit_code = match run_scenarios(&config, &table).await {
            Ok(results) => summarize(&results),
            Err(error) => {
                println!("{:#?}", error);
                1
            }
        };

        if let Some(fixture) = fixture {
            if let Err(err) = fixture.stop().await {
                warn!(%err, "failed to stop the fixture site");
            }
        }
        exit_code
    });

    std::process::exit(exit_code);
}

async fn run_scenarios(
    config: &HarnessConfig,
    table: &ScenarioTable,
) -> anyhow::Result<Vec<ScenarioResult>> {
    let playwright = Playwright::initialize().await?;
    playwright.prepare()?; // Install browsers

    let mut browsers = Vec::new();
    let mut initialization_errors: Option<ErrorList<FailedToInitialize>> = None;
    for &browser_type in &config.browsers {
        let engine = match browser_type {
            BrowserType::Chromium => playwright.chromium(),
            BrowserType::Firefox => playwright.firefox(),
            BrowserType::Webkit => playwright.webkit(),
        };
        match engine.launcher().headless(config.headless).launch().await {
            Ok(browser) => browsers.push((browser_type, browser)),
            Err(err) => {
                ErrorList::record(
                    &mut initialization_errors,
                    FailedToInitialize(browser_type),
                    err,
                );
            }
        }
    }

    if let Some(errors) = initialization_errors {
        return Err(errors.into());
    }

    info!(
        scenarios = table.len(),
        browsers = browsers.len(),
        "running scenario table"
    );

    let browsers = &browsers;
    let (results, error_list) = stream::iter(table.cases())
        .flat_map(|prepared| {
            stream::iter(browsers.iter()).map(move |(browser_type, browser)| async move {
                let browser_type = *browser_type;
                let opening_failed = || FailedToOpenPage {
                    scenario_id: prepared.case.id.clone(),
                    browser_type,
                };
                let context = browser
                    .context_builder()
                    .build()
                    .await
                    .map_err(|err| (opening_failed(), anyhow::Error::from(err)))?;
                let page = context
                    .new_page()
                    .await
                    .map_err(|err| (opening_failed(), anyhow::Error::from(err)))?;

                let test_result = catch_panics(run_scenario(&page, config, prepared))
                    .map(|result| ScenarioResult {
                        scenario_id: prepared.case.id.clone(),
                        browser_type,
                        result,
                    })
                    .inspect(|test_result| println!("{}", test_result))
                    .await;

                if let Err(err) = context.close().await {
                    warn!(%err, "failed to close browser context");
                }
                Ok::<_, (FailedToOpenPage, anyhow::Error)>(test_result)
            })
        })
        .fold(
            (Vec::new(), None),
            |(mut test_results, errors), result| async {
                match (result.await, errors) {
                    (Ok(test_result), errors) => {
                        test_results.push(test_result);
                        (test_results, errors)
                    }
                    (Err((context, err)), None) => {
                        (test_results, Some(ErrorList::new(context, err)))
                    }
                    (Err((context, err)), Some(mut error_list)) => {
                        error_list.push(context, err);
                        (test_results, Some(error_list))
                    }
                }
            },
        )
        .await;

    if let Some(error_list) = error_list {
        return Err(error_list.into());
    }

    Ok(results)
}
