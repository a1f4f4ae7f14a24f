//! Streaming session lifecycle
//!
//! Owns the open output stream and drives it through
//! Unopened -> Open -> Running -> Stopped -> Closed. Every failure branch
//! funnels through one terminal transition that releases whatever was
//! acquired, so host resources are never left dangling on an error path.
//!
//! The state machine talks to the host through the [`StreamHost`] /
//! [`OutputStream`] seam; [`CpalHost`] is the production implementation.

use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use log::{debug, error, info};

use crate::config::{FRAMES_PER_BUFFER, SAMPLE_RATE};
use crate::error::{ToneError, ToneResult};
use crate::route::ChannelRoute;
use crate::wavetable::TonePlayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Open,
    Running,
    Stopped,
    Closed,
    Failed,
}

/// An open output stream the session can drive
pub trait OutputStream {
    fn start(&mut self) -> ToneResult<()>;
    fn stop(&mut self) -> ToneResult<()>;
    fn close(self) -> ToneResult<()>;
}

/// Something that can open an output stream for the session
pub trait StreamHost {
    type Stream: OutputStream;
    fn open_stream(&mut self) -> ToneResult<Self::Stream>;
}

/// Production host: opens a cpal output stream on the routed device.
///
/// The stream is opened at the device's full output width so the routed
/// channel indices are addressable; the callback writes silence to every
/// channel the route does not cover.
pub struct CpalHost {
    device: cpal::Device,
    route: ChannelRoute,
    player: Option<TonePlayer>,
}

impl CpalHost {
    pub fn new(device: cpal::Device, route: ChannelRoute, player: TonePlayer) -> CpalHost {
        CpalHost {
            device,
            route,
            player: Some(player),
        }
    }
}

impl StreamHost for CpalHost {
    type Stream = CpalStream;

    fn open_stream(&mut self) -> ToneResult<CpalStream> {
        let config = StreamConfig {
            channels: self.route.channels(),
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: BufferSize::Fixed(FRAMES_PER_BUFFER),
        };
        let channels = self.route.channels() as usize;
        let route = self.route.clone();
        // The player moves into the callback whole: the real-time thread
        // becomes its exclusive owner, no locks anywhere on that path.
        let mut player = self
            .player
            .take()
            .ok_or_else(|| ToneError::StreamOpen("stream already opened once".to_string()))?;
        debug!(
            "Opening stream on {}: {} channels, {} Hz, {} frames/buffer",
            self.route.device().name,
            channels,
            SAMPLE_RATE,
            FRAMES_PER_BUFFER
        );
        let stream = self
            .device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    player.render(data, channels, &route);
                },
                move |err| {
                    error!("Output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| ToneError::StreamOpen(e.to_string()))?;
        Ok(CpalStream { stream })
    }
}

/// Open cpal stream; dropping it releases the host-side resources
pub struct CpalStream {
    stream: cpal::Stream,
}

impl OutputStream for CpalStream {
    fn start(&mut self) -> ToneResult<()> {
        self.stream
            .play()
            .map_err(|e| ToneError::StreamStart(e.to_string()))
    }

    fn stop(&mut self) -> ToneResult<()> {
        self.stream
            .pause()
            .map_err(|e| ToneError::StreamStop(e.to_string()))
    }

    fn close(self) -> ToneResult<()> {
        drop(self.stream);
        Ok(())
    }
}

/// One playback session per process run
pub struct StreamSession<H: StreamHost> {
    host: H,
    stream: Option<H::Stream>,
    state: SessionState,
}

impl<H: StreamHost> StreamSession<H> {
    pub fn new(host: H) -> StreamSession<H> {
        StreamSession {
            host,
            stream: None,
            state: SessionState::Unopened,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn open(&mut self) -> ToneResult<()> {
        debug_assert_eq!(self.state, SessionState::Unopened);
        match self.host.open_stream() {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = SessionState::Open;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn start(&mut self) -> ToneResult<()> {
        debug_assert_eq!(self.state, SessionState::Open);
        let result = match self.stream.as_mut() {
            Some(stream) => stream.start(),
            None => Err(ToneError::StreamStart("no open stream".to_string())),
        };
        match result {
            Ok(()) => {
                self.state = SessionState::Running;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn stop(&mut self) -> ToneResult<()> {
        debug_assert_eq!(self.state, SessionState::Running);
        let result = match self.stream.as_mut() {
            Some(stream) => stream.stop(),
            None => Err(ToneError::StreamStop("no open stream".to_string())),
        };
        match result {
            Ok(()) => {
                self.state = SessionState::Stopped;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn close(&mut self) -> ToneResult<()> {
        debug_assert_eq!(self.state, SessionState::Stopped);
        let result = match self.stream.take() {
            Some(stream) => stream.close(),
            None => Err(ToneError::StreamClose("no open stream".to_string())),
        };
        match result {
            Ok(()) => {
                self.state = SessionState::Closed;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Open, play for `duration`, stop and close. The sleep is the only
    /// suspension point and is not cancellable; there is no early stop.
    pub fn run(&mut self, duration: Duration) -> ToneResult<()> {
        self.open()?;
        self.start()?;
        info!("Stream running for {:?}", duration);
        std::thread::sleep(duration);
        self.stop()?;
        self.close()
    }

    /// Single terminal failure transition. Releases any stream acquired so
    /// far; the session stays in Failed and cannot be reused.
    fn fail(&mut self, err: ToneError) -> ToneError {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.close() {
                error!("Releasing stream after failure also failed: {}", e);
            }
        }
        self.state = SessionState::Failed;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Which stage the mock host should reject, if any
    #[derive(Clone, Copy, PartialEq)]
    enum FailAt {
        Nowhere,
        Open,
        Start,
        Stop,
    }

    struct MockHost {
        fail_at: FailAt,
        teardowns: Arc<AtomicUsize>,
    }

    struct MockStream {
        fail_at: FailAt,
        teardowns: Arc<AtomicUsize>,
        released: bool,
    }

    impl StreamHost for MockHost {
        type Stream = MockStream;

        fn open_stream(&mut self) -> ToneResult<MockStream> {
            if self.fail_at == FailAt::Open {
                return Err(ToneError::StreamOpen("simulated open failure".to_string()));
            }
            Ok(MockStream {
                fail_at: self.fail_at,
                teardowns: Arc::clone(&self.teardowns),
                released: false,
            })
        }
    }

    impl OutputStream for MockStream {
        fn start(&mut self) -> ToneResult<()> {
            if self.fail_at == FailAt::Start {
                return Err(ToneError::StreamStart("simulated start failure".to_string()));
            }
            Ok(())
        }

        fn stop(&mut self) -> ToneResult<()> {
            if self.fail_at == FailAt::Stop {
                return Err(ToneError::StreamStop("simulated stop failure".to_string()));
            }
            Ok(())
        }

        fn close(mut self) -> ToneResult<()> {
            self.released = true;
            self.teardowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Drop for MockStream {
        fn drop(&mut self) {
            // close() already counted; a leaked stream counts here
            if !self.released {
                self.teardowns.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn session(fail_at: FailAt) -> (StreamSession<MockHost>, Arc<AtomicUsize>) {
        let teardowns = Arc::new(AtomicUsize::new(0));
        let host = MockHost {
            fail_at,
            teardowns: Arc::clone(&teardowns),
        };
        (StreamSession::new(host), teardowns)
    }

    #[test]
    fn full_run_walks_every_state_in_order() {
        let (mut session, teardowns) = session(FailAt::Nowhere);
        assert_eq!(session.state(), SessionState::Unopened);
        session.open().unwrap();
        assert_eq!(session.state(), SessionState::Open);
        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Running);
        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        session.close().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_duration_run_completes_cleanly() {
        let (mut session, teardowns) = session(FailAt::Nowhere);
        session.run(Duration::ZERO).unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rejected_open_goes_straight_to_failed() {
        let (mut session, teardowns) = session(FailAt::Open);
        let err = session.run(Duration::ZERO).unwrap_err();
        assert_eq!(session.state(), SessionState::Failed);
        assert!(matches!(err, ToneError::StreamOpen(_)));
        assert_eq!(err.exit_code(), 3);
        // nothing was acquired, nothing to release
        assert_eq!(teardowns.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn start_failure_releases_the_stream_once() {
        let (mut session, teardowns) = session(FailAt::Start);
        let err = session.run(Duration::ZERO).unwrap_err();
        assert_eq!(session.state(), SessionState::Failed);
        assert!(matches!(err, ToneError::StreamStart(_)));
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_failure_releases_the_stream_once() {
        let (mut session, teardowns) = session(FailAt::Stop);
        let err = session.run(Duration::ZERO).unwrap_err();
        assert_eq!(session.state(), SessionState::Failed);
        assert!(matches!(err, ToneError::StreamStop(_)));
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }
}
