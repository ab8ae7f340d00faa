//! 스캔 세션 — 제출 채널의 단일 소비자
//!
//! 디코드 루프(생산자)가 내보낸 [`SubmissionEvent`]를 하나씩
//! 프로세서에 통과시키고, 결과를 [`FeedbackEvent`]로, 발생한
//! 알림을 [`AlertEvent`]로 다운스트림에 내보냅니다.
//!
//! 세션은 행위자와 동작 템플릿을 고정으로 들고 있습니다
//! (유통사 세션 = 목적지가 정해진 활성화, 약국 세션 = 입고 또는
//! 판매 모드). 프로세서는 호출 사이에 상태가 없고, 세션 상태는
//! 반복 억제 캐시뿐입니다.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use pharmatrace_core::event::{AlertEvent, FeedbackEvent, SubmissionEvent};
use pharmatrace_core::store::{AlertStore, UnitStore};

use crate::error::ScanEngineError;
use crate::processor::ScanProcessor;
use crate::request::{ActorContext, ScanAction, ScanOutcome, ScanRequest};

/// 스캔 세션
pub struct ScanSession<S, A> {
    processor: ScanProcessor<S, A>,
    actor: ActorContext,
    action: ScanAction,
    submission_rx: mpsc::Receiver<SubmissionEvent>,
    feedback_tx: mpsc::Sender<FeedbackEvent>,
    alert_tx: Option<mpsc::Sender<AlertEvent>>,
    processed_count: u64,
}

impl<S: UnitStore, A: AlertStore> ScanSession<S, A> {
    /// 새 세션을 생성합니다.
    pub fn new(
        processor: ScanProcessor<S, A>,
        actor: ActorContext,
        action: ScanAction,
        submission_rx: mpsc::Receiver<SubmissionEvent>,
        feedback_tx: mpsc::Sender<FeedbackEvent>,
    ) -> Self {
        Self {
            processor,
            actor,
            action,
            submission_rx,
            feedback_tx,
            alert_tx: None,
            processed_count: 0,
        }
    }

    /// 알림 관찰자 채널을 연결합니다.
    pub fn with_alert_sender(mut self, alert_tx: mpsc::Sender<AlertEvent>) -> Self {
        self.alert_tx = Some(alert_tx);
        self
    }

    /// 처리한 제출 수를 반환합니다.
    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    /// 세션을 실행합니다.
    ///
    /// 제출 채널이 닫히거나 cancellation token이 발동되면 종료되고
    /// 제출 수신 채널을 반환하여 재시작을 지원합니다.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<SubmissionEvent>, ScanEngineError> {
        info!(actor = %self.actor, action = %self.action, "starting scan session");

        loop {
            tokio::select! {
                submission = self.submission_rx.recv() => {
                    match submission {
                        Some(submission) => self.handle_submission(submission).await?,
                        None => {
                            info!("submission channel closed, shutting down scan session");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("scan session received shutdown signal");
                    break;
                }
            }
        }

        Ok(self.submission_rx)
    }

    /// 제출 하나를 처리하고 결과를 내보냅니다.
    async fn handle_submission(
        &mut self,
        submission: SubmissionEvent,
    ) -> Result<(), ScanEngineError> {
        let trace_id = submission.metadata.trace_id.clone();
        let identifier = submission.identifier.clone();

        let request = ScanRequest::new(
            identifier.clone(),
            self.actor.clone(),
            self.action.clone(),
        );

        let result = self.processor.process(request).await;
        self.processed_count += 1;

        let feedback = match result {
            // 억제된 반복은 정의된 no-op — 피드백도 내보내지 않음
            Ok(ScanOutcome::Suppressed) => return Ok(()),
            Ok(outcome) => {
                FeedbackEvent::with_trace(&identifier, true, outcome.to_string(), &trace_id)
            }
            Err(ScanEngineError::Anomaly { category, alert }) => {
                if let Some(alert_tx) = &self.alert_tx
                    && let Err(e) = alert_tx
                        .send(AlertEvent::with_trace((*alert).clone(), &trace_id))
                        .await
                {
                    error!(error = %e, "failed to forward alert event");
                }
                FeedbackEvent::with_trace(
                    &identifier,
                    false,
                    format!("ALERT: {category}"),
                    &trace_id,
                )
            }
            Err(ScanEngineError::Store(e)) => {
                // 스토어 장애: 이 스캔은 실패로 보고하고 세션은 계속
                error!(error = %e, "store failure during scan");
                FeedbackEvent::with_trace(
                    &identifier,
                    false,
                    "store unavailable, retry scan",
                    &trace_id,
                )
            }
            Err(e) => FeedbackEvent::with_trace(&identifier, false, e.to_string(), &trace_id),
        };

        self.feedback_tx
            .send(feedback)
            .await
            .map_err(|e| ScanEngineError::Channel(e.to_string()))
    }
}
