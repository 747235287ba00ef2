//! One scenario, start to finish: navigate, select the language, commit the
//! input, then poll the output. Steps run strictly in that order.

use crate::{
    config::HarnessConfig,
    error::HarnessError,
    input::{DriveReport, InputDriver},
    locator::{LocatorResolver, OptionalControl},
    output::OutputReader,
    polling::{wait_for_change, PollReport, PollState, PollingAssertion, Predicate},
    surface::Surface,
};
use tokio::time::timeout;
use tracing::{debug, info, info_span, Instrument};
use translit_common::PreparedCase;

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub id: String,
    pub drive: DriveReport,
    /// Outcome of the submission control on the second entry, if there was one.
    pub resubmit: Option<OptionalControl>,
    /// One report per assertion; two when the case re-enters its input.
    pub polls: Vec<PollReport>,
}

/// Runs `prepared` against `surface`, bounded by the scenario ceiling.
pub async fn run_scenario<S: Surface + ?Sized>(
    surface: &S,
    config: &HarnessConfig,
    prepared: &PreparedCase,
) -> Result<ScenarioReport, HarnessError> {
    let ceiling = config.timeouts.scenario();
    let span = info_span!("scenario", id = %prepared.case.id);
    timeout(ceiling, run_steps(surface, config, prepared).instrument(span))
        .await
        .map_err(|_| HarnessError::ScenarioTimeout(ceiling))?
}

async fn run_steps<S: Surface + ?Sized>(
    surface: &S,
    config: &HarnessConfig,
    prepared: &PreparedCase,
) -> Result<ScenarioReport, HarnessError> {
    let case = &prepared.case;
    let timeouts = config.timeouts;

    info!(url = config.base_url.as_str(), label = case.label.as_str(), "navigating");
    surface
        .goto(&config.base_url)
        .await
        .map_err(|err| HarnessError::required("navigation", err))?;

    let driver = InputDriver::new(surface, timeouts);
    let drive = driver
        .drive(&config.target_language, &case.input, case.discipline)
        .await?;
    info!(language = %drive.language, submit = %drive.submit, "input committed");

    let reader = OutputReader::new(
        surface,
        LocatorResolver::new(surface, timeouts),
        config.script,
    );
    let assertion = PollingAssertion::new(
        prepared.anchor.clone(),
        Predicate::for_expectation(&case.expectation),
    )
    .with_window(timeouts.output())
    .with_interval(timeouts.poll_interval())
    .with_sample_bound(timeouts.element());

    let mut polls = vec![assertion.verify(&reader).await?];
    let mut resubmit = None;

    if case.reenter {
        info!("re-entering the same input");
        let field = LocatorResolver::new(surface, timeouts).input_field().await?;
        driver.clear(&field).await?;

        // The second assertion must not see what the first entry rendered.
        let settled = wait_for_change(
            &reader,
            &polls[0].last_observed,
            timeouts.output(),
            timeouts.poll_interval(),
        )
        .await;
        if settled.state == PollState::TimedOut {
            return Err(HarnessError::StaleOutput {
                timeout: timeouts.output(),
                last_observed: settled.last_observed,
            });
        }
        debug!(
            samples = settled.samples,
            elapsed_ms = settled.elapsed.as_millis() as u64,
            "previous output cleared"
        );

        driver.enter(&field, &case.input, case.discipline).await?;
        let submit = driver.submit().await;
        info!(submit = %submit, "input re-committed");
        resubmit = Some(submit);
        polls.push(assertion.verify(&reader).await?);
    }

    for poll in &polls {
        info!(
            state = ?poll.state,
            samples = poll.samples,
            elapsed_ms = poll.elapsed.as_millis() as u64,
            "assertion passed"
        );
    }

    Ok(ScenarioReport {
        id: case.id.clone(),
        drive,
        resubmit,
        polls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_page::FakePage;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };
    use translit_common::singlish::transliterate;
    use tokio::time::Instant;
    use translit_common::{ScenarioCase, ScenarioTable};

    fn prepare(case: ScenarioCase) -> PreparedCase {
        ScenarioTable::new(vec![case]).unwrap().cases()[0].clone()
    }

    #[tokio::test(start_paused = true)]
    async fn atomic_sentence_converges_on_native_page() {
        let page = FakePage::native().with_mirror().with_button("Translate", true);
        let case = prepare(ScenarioCase::expecting(
            "Pos_0001",
            "",
            "mama heta enavaa",
            "මම හෙට එනවා",
            "මම හෙට",
        ));
        let report = run_scenario(&page, &HarnessConfig::default(), &case)
            .await
            .unwrap();
        assert_eq!(report.drive.language, OptionalControl::Used);
        assert_eq!(report.drive.submit, OptionalControl::Used);
        assert_eq!(report.polls[0].state, PollState::Succeeded);
        assert!(report.polls[0].last_observed.contains("මම හෙට"));
        assert_eq!(page.calls()[0], "goto http://127.0.0.1:8000/");
    }

    #[tokio::test(start_paused = true)]
    async fn mixed_casing_never_shows_forbidden_anchor() {
        let page = FakePage::composite();
        let case = prepare(ScenarioCase::forbidding(
            "Neg_0001",
            "",
            "MaMa GeDhArA YaNaVaA",
            "මම ගෙදර යනවා",
            "මම ගෙදර",
        ));
        let started = Instant::now();
        let report = run_scenario(&page, &HarnessConfig::default(), &case)
            .await
            .unwrap();
        assert_eq!(report.polls[0].state, PollState::Held);
        assert!(started.elapsed() >= Duration::from_secs(25));
        assert!(!report.polls[0].last_observed.contains("මම ගෙදර"));
        assert!(!report.polls[0].last_observed.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn irregular_spacing_typed_incrementally_converges() {
        let page = FakePage::plain().with_button("Translate", false);
        let case = prepare(
            ScenarioCase::expecting(
                "UI_0001",
                "",
                "mama        pansal yanavaa",
                "මම පන්සල් යනවා",
                "මම පන්සල්",
            )
            .typed(40),
        );
        let report = run_scenario(&page, &HarnessConfig::default(), &case)
            .await
            .unwrap();
        assert_eq!(report.drive.language, OptionalControl::Absent);
        assert!(matches!(report.drive.submit, OptionalControl::Failed(_)));
        assert_eq!(report.polls[0].state, PollState::Succeeded);
        assert_eq!(page.keystrokes(), "mama        pansal yanavaa".chars().count());
    }

    fn reentered_case() -> PreparedCase {
        prepare(
            ScenarioCase::expecting("UI_0002", "", "mama heta enavaa", "මම හෙට එනවා", "මම හෙට")
                .typed(40)
                .reentered(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn reentering_the_same_text_gives_the_same_outcome() {
        let page = FakePage::native()
            .with_mirror()
            .with_sticky_output()
            .with_button("Translate", true);
        let report = run_scenario(&page, &HarnessConfig::default(), &reentered_case())
            .await
            .unwrap();
        assert_eq!(report.polls.len(), 2);
        assert_eq!(report.polls[0].state, report.polls[1].state);
        assert_eq!(report.polls[0].last_observed, report.polls[1].last_observed);
        assert!(report.polls[1].samples > 1);
        assert_eq!(report.resubmit, Some(OptionalControl::Used));
        assert_eq!(page.input_text(), "mama heta enavaa");
        assert_eq!(page.calls().iter().filter(|call| *call == "clear").count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn second_entry_rendering_differently_fails() {
        let renders = Arc::new(AtomicUsize::new(0));
        let counter = renders.clone();
        let page = FakePage::native()
            .with_mirror()
            .with_sticky_output()
            .with_renderer(move |text, _| {
                if text == "mama heta enavaa"
                    && counter.fetch_add(1, Ordering::SeqCst) >= 1
                {
                    "වැරදි".to_string()
                } else {
                    transliterate(text)
                }
            });
        let err = run_scenario(&page, &HarnessConfig::default(), &reentered_case())
            .await
            .unwrap_err();
        assert_eq!(renders.load(Ordering::SeqCst), 2);
        assert!(matches!(
            err,
            HarnessError::Assertion { predicate: Predicate::Contains, ref last_observed, .. }
                if last_observed == "වැරදි"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn output_that_survives_clearing_is_reported() {
        let page = FakePage::native()
            .with_mirror()
            .with_sticky_output()
            .with_renderer(|_, _| "මම හෙට එනවා".to_string());
        let err = run_scenario(&page, &HarnessConfig::default(), &reentered_case())
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::StaleOutput { .. }), "{:?}", err);
    }

    #[tokio::test(start_paused = true)]
    async fn single_entry_has_no_resubmit_outcome() {
        let page = FakePage::plain().with_button("Translate", false);
        let case = prepare(ScenarioCase::expecting(
            "Pos_0001",
            "",
            "mama heta enavaa",
            "මම හෙට එනවා",
            "මම හෙට",
        ));
        let report = run_scenario(&page, &HarnessConfig::default(), &case)
            .await
            .unwrap();
        assert_eq!(report.resubmit, None);
        assert_eq!(report.polls.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unusable_switcher_surfaces_as_assertion_failure() {
        let page = FakePage::composite();
        let config = HarnessConfig {
            target_language: "Tamil".to_string(),
            ..HarnessConfig::default()
        };
        let case = prepare(ScenarioCase::expecting(
            "Pos_0001",
            "",
            "mama heta enavaa",
            "මම හෙට එනවා",
            "මම හෙට",
        ));
        let err = run_scenario(&page, &config, &case).await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Assertion { predicate: Predicate::Contains, ref anchor, .. } if anchor == "මම හෙට"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn forbidden_anchor_fails_as_soon_as_it_renders() {
        let page = FakePage::plain().with_renderer(|_, _| "මම ගෙදර යනවා".to_string());
        let case = prepare(ScenarioCase::forbidding(
            "Neg_0001",
            "",
            "MaMa GeDhArA YaNaVaA",
            "මම ගෙදර යනවා",
            "මම ගෙදර",
        ));
        let started = Instant::now();
        let err = run_scenario(&page, &HarnessConfig::default(), &case)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Assertion { predicate: Predicate::NotContains, reason, .. }
                if reason == "forbidden anchor observed"
        ));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_ceiling_cuts_long_runs() {
        let page = FakePage::plain();
        let mut config = HarnessConfig::default();
        config.timeouts.scenario_ms = 5_000;
        let case = prepare(ScenarioCase::forbidding("Neg", "", "pansal", "මම පන්සල්", "මම"));
        let err = run_scenario(&page, &config, &case).await.unwrap_err();
        assert!(matches!(err, HarnessError::ScenarioTimeout(ceiling) if ceiling == Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn builtin_table_passes_on_every_ui_shape() {
        let table = ScenarioTable::builtin().unwrap();
        let shapes: Vec<(&str, fn() -> FakePage)> = vec![
            ("native", || FakePage::native().with_mirror().with_button("Translate", true)),
            ("composite", FakePage::composite),
            ("plain", || FakePage::plain().with_button("Translate", false)),
        ];
        for (shape, page) in shapes {
            for prepared in table.cases() {
                let page = page();
                let result = run_scenario(&page, &HarnessConfig::default(), prepared).await;
                assert!(
                    result.is_ok(),
                    "{} on {} page: {:?}",
                    prepared.case.id,
                    shape,
                    result.err()
                );
            }
        }
    }
}
