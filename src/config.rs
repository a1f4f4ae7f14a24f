pub const SAMPLE_RATE: u32 = 44100;
pub const FRAMES_PER_BUFFER: u32 = 64;
pub const PLAY_SECONDS: u64 = 10;
//TEST TONE
pub const TABLE_SIZE: usize = 200;
pub const AMPLITUDE: f32 = 0.8;
//E-MU patchmix convention: tone goes out channels 7-8 of the interface
pub const DEFAULT_DEVICE: &str = "E-MU ASIO";
pub const DEFAULT_LEFT: usize = 6;
pub const DEFAULT_RIGHT: usize = 7;
