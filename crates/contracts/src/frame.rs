//! SensorEvent - Ingestion 输出
//!
//! 彩色图像帧、骨骼帧以及合并后的传感器事件。

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Skeleton, SpeechResult};

/// 彩色图像格式 (分辨率 + 帧率)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorImageFormat {
    /// 图像宽度 (像素)
    pub width: u32,

    /// 图像高度 (像素)
    pub height: u32,

    /// 帧率 (fps)
    pub fps: u32,
}

impl ColorImageFormat {
    /// RGB 640x480 @ 30fps
    pub const RGB_640X480_FPS30: ColorImageFormat = ColorImageFormat {
        width: 640,
        height: 480,
        fps: 30,
    };

    /// RGB 1280x960 @ 12fps
    pub const RGB_1280X960_FPS12: ColorImageFormat = ColorImageFormat {
        width: 1280,
        height: 960,
        fps: 12,
    };

    /// 每行字节数 (BGR32: 每像素 4 字节)
    pub fn stride(&self) -> usize {
        self.width as usize * PixelFormat::Bgr32.bytes_per_pixel()
    }

    /// 整帧字节数
    pub fn frame_len(&self) -> usize {
        self.stride() * self.height as usize
    }

    /// 帧间隔 (秒)
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }
}

impl Default for ColorImageFormat {
    fn default() -> Self {
        Self::RGB_640X480_FPS30
    }
}

/// 像素格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// B, G, R, 填充字节
    #[default]
    Bgr32,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Bgr32 => 4,
        }
    }
}

/// 彩色图像帧
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorFrame {
    /// 传感器时间戳 (秒)
    pub timestamp: f64,

    /// 帧序号
    pub frame_number: u64,

    /// 图像格式
    pub format: ColorImageFormat,

    /// 像素格式
    #[serde(default)]
    pub pixel_format: PixelFormat,

    /// 原始像素数据 (零拷贝)，录制文件中可省略
    #[serde(default)]
    pub pixels: Bytes,
}

/// 骨骼帧
///
/// `skeletons` 长度等于传感器的骨骼槽位数 (通常为 6)，未使用的槽位为 NotTracked。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkeletonFrame {
    /// 传感器时间戳 (秒)
    pub timestamp: f64,

    /// 帧序号
    pub frame_number: u64,

    /// 骨骼槽位数组
    pub skeletons: Vec<Skeleton>,
}

/// 同一时刻就绪的所有帧
///
/// 任意一个帧都可能缺失；缺失帧意味着本 tick 对应的处理跳过。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllFramesReady {
    /// 事件时间戳 (秒) - 游戏主时钟
    pub timestamp: f64,

    /// 彩色图像帧
    #[serde(default)]
    pub color: Option<ColorFrame>,

    /// 骨骼帧
    #[serde(default)]
    pub skeleton: Option<SkeletonFrame>,
}

/// 送入引擎的传感器事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorEvent {
    /// 帧就绪
    Frames(AllFramesReady),

    /// 语音识别结果
    Speech(SpeechResult),
}

impl SensorEvent {
    pub fn timestamp(&self) -> f64 {
        match self {
            SensorEvent::Frames(frames) => frames.timestamp,
            SensorEvent::Speech(speech) => speech.timestamp,
        }
    }

    /// 用于日志/指标的事件类别
    pub fn kind(&self) -> &'static str {
        match self {
            SensorEvent::Frames(_) => "frames",
            SensorEvent::Speech(_) => "speech",
        }
    }
}
