//! 디코드 루프 — 프레임 스트림을 스캔 제출로 변환하는 유한 속도 생산자
//!
//! 카메라 캡처가 보내는 원시 프레임(`Bytes`)을 고정 주기로
//! [`FrameDecoder`]에 통과시키고, 디코드 결과가 비어 있지 않고
//! 직전 결과와 달라졌을 때만 [`SubmissionEvent`] 하나를 세션
//! 채널로 내보냅니다. 같은 코드가 연속 프레임에서 반복 디코드되는
//! 경우는 여기서 걸러지고, 시간을 두고 반복되는 경우는 프로세서의
//! 반복 억제가 맡습니다.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use pharmatrace_core::boundary::FrameDecoder;
use pharmatrace_core::event::SubmissionEvent;

use crate::error::ScanEngineError;

/// 디코드 루프
pub struct DecodeLoop<D> {
    decoder: D,
    frame_rx: mpsc::Receiver<Bytes>,
    submission_tx: mpsc::Sender<SubmissionEvent>,
    interval: Duration,
    last_decoded: Option<String>,
    decoded_count: u64,
}

impl<D: FrameDecoder> DecodeLoop<D> {
    /// 새 디코드 루프를 생성합니다.
    ///
    /// # Arguments
    /// - `decoder`: 프레임 -> 문자열 불투명 서비스
    /// - `frame_rx`: 카메라 캡처에서 전달받은 프레임 수신 채널
    /// - `submission_tx`: 스캔 세션으로의 제출 전송 채널
    /// - `interval_ms`: 디코드 주기 (밀리초)
    pub fn new(
        decoder: D,
        frame_rx: mpsc::Receiver<Bytes>,
        submission_tx: mpsc::Sender<SubmissionEvent>,
        interval_ms: u64,
    ) -> Self {
        Self {
            decoder,
            frame_rx,
            submission_tx,
            interval: Duration::from_millis(interval_ms),
            last_decoded: None,
            decoded_count: 0,
        }
    }

    /// 지금까지 내보낸 제출 수를 반환합니다.
    pub fn decoded_count(&self) -> u64 {
        self.decoded_count
    }

    /// 루프를 실행합니다.
    ///
    /// 프레임 채널이 닫히거나 cancellation token이 발동되면 종료되고
    /// 프레임 수신 채널을 반환하여 재시작을 지원합니다.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<Bytes>, ScanEngineError> {
        info!(decoder = self.decoder.name(), "starting decode loop");
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                frame = self.frame_rx.recv() => {
                    match frame {
                        Some(frame) => {
                            // 유한 속도: 주기당 최대 한 프레임
                            ticker.tick().await;
                            self.handle_frame(&frame).await?;
                        }
                        None => {
                            info!("frame channel closed, shutting down decode loop");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("decode loop received shutdown signal");
                    break;
                }
            }
        }

        Ok(self.frame_rx)
    }

    /// 프레임 하나를 디코드하고, 새로운 결과면 제출을 내보냅니다.
    async fn handle_frame(&mut self, frame: &Bytes) -> Result<(), ScanEngineError> {
        let Some(text) = self.decoder.decode(frame) else {
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        // 직전과 같은 결과는 같은 코드가 계속 화면에 있는 것 — 제출 아님
        if self.last_decoded.as_deref() == Some(text.as_str()) {
            return Ok(());
        }

        debug!(identifier = %text, "decoded new identifier");
        self.last_decoded = Some(text.clone());
        self.decoded_count += 1;

        self.submission_tx
            .send(SubmissionEvent::new(text))
            .await
            .map_err(|e| ScanEngineError::Channel(e.to_string()))?;
        Ok(())
    }
}
