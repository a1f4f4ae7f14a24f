//! Output channel routing for multi-channel interfaces
//!
//! A [`ChannelRoute`] pins the stereo tone to two physical output channels
//! of a specific device. The host API has no channel-selector extension,
//! so the stream is opened at the device's full output width and the
//! callback writes only the routed channel offsets inside each frame.
//! Validation happens here, before any stream is opened.

use crate::devices::DeviceDescriptor;
use crate::error::{ToneError, ToneResult};

/// Validated (left, right) output channel pair on one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRoute {
    device: DeviceDescriptor,
    left: usize,
    right: usize,
}

impl ChannelRoute {
    /// Validate the requested pair against the device capacity.
    ///
    /// Both indices must individually be below the device's maximum output
    /// channel count. Routing both sides to the same physical channel is
    /// allowed.
    pub fn new(device: &DeviceDescriptor, left: usize, right: usize) -> ToneResult<ChannelRoute> {
        for index in [left, right] {
            if index >= device.max_output_channels as usize {
                return Err(ToneError::ChannelOutOfRange {
                    index,
                    max: device.max_output_channels,
                    device: device.name.clone(),
                });
            }
        }
        Ok(ChannelRoute {
            device: device.clone(),
            left,
            right,
        })
    }

    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn right(&self) -> usize {
        self.right
    }

    /// Stream width to open so both routed channels are addressable
    pub fn channels(&self) -> u16 {
        self.device.max_output_channels
    }
}
