//! 整合測試 - 預覽圖產生管線
//!
//! 從合成的 PNG 串流一路跑到預覽圖輸出，不需要 ffmpeg

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use video_batch_tools::component::preview_generator::{
    FRAMES_PER_SHEET, FrameDemuxer, MosaicAssembler, compose_sheet,
};

fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// 測試 1: 串流 -> 影格區間 -> 解碼 -> 拼貼，夾雜雜訊
#[test]
fn test_stream_to_single_sheet() {
    // 三張有效影格，第二張前面插入 5 個雜訊位元組
    let colors = [[255u8, 0, 0], [0, 255, 0], [0, 0, 255]];
    let mut stream = Vec::new();
    stream.extend_from_slice(&png_bytes(6, 4, colors[0]));
    stream.extend_from_slice(&[0x13, 0x37, 0x00, 0xFF, 0x42]);
    stream.extend_from_slice(&png_bytes(6, 4, colors[1]));
    stream.extend_from_slice(&png_bytes(6, 4, colors[2]));

    let demuxed = FrameDemuxer::new(Cursor::new(stream)).scan().unwrap();
    assert_eq!(demuxed.ranges().len(), 3);

    let decoded = demuxed.decode_frames();
    assert_eq!(decoded.frames.len(), 3);
    assert_eq!(decoded.failed, 0);

    // 三張影格都落在第一列：(row 0, col 0/1/2)
    let canvas = compose_sheet(&decoded.frames, 6, 4);
    assert_eq!(canvas.dimensions(), (60, 40));
    assert_eq!(canvas.get_pixel(0, 0), &Rgb(colors[0]));
    assert_eq!(canvas.get_pixel(6, 0), &Rgb(colors[1]));
    assert_eq!(canvas.get_pixel(12, 0), &Rgb(colors[2]));
    // 第四格沒有影格，維持底色
    assert_eq!(canvas.get_pixel(18, 0), &Rgb([0, 0, 0]));

    // 寫出實際的 JPEG 檔
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("pre%n.jpg");
    let assembler = MosaicAssembler::new(template.to_str().unwrap(), 80);
    let written = assembler.assemble(&decoded.frames).unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(written[0], dir.path().join("pre0.jpg"));
    assert!(written[0].is_file());
}

/// 測試 2: 超過一組的影格數會分成多張預覽圖
#[test]
fn test_stream_to_multiple_sheets() {
    let mut stream = Vec::new();
    for i in 0..(FRAMES_PER_SHEET + 20) {
        stream.extend_from_slice(&png_bytes(2, 2, [i as u8, 0, 0]));
    }

    let demuxed = FrameDemuxer::new(Cursor::new(stream)).scan().unwrap();
    assert_eq!(demuxed.ranges().len(), FRAMES_PER_SHEET + 20);

    let decoded = demuxed.decode_frames();
    assert_eq!(decoded.frames.len(), FRAMES_PER_SHEET + 20);

    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("map%n.jpg");
    let assembler = MosaicAssembler::new(template.to_str().unwrap(), 50);
    let written = assembler.assemble(&decoded.frames).unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(written[0], dir.path().join("map0.jpg"));
    assert_eq!(written[1], dir.path().join("map100.jpg"));

    // 第二張的 JPEG 可以讀回來，尺寸是完整的 10x10 網格
    let sheet = image::open(&written[1]).unwrap().into_rgb8();
    assert_eq!(sheet.dimensions(), (20, 20));
}

/// 測試 3: 串流尾端被截斷的影格不會進入拼貼
#[test]
fn test_truncated_stream_end_to_end() {
    let mut stream = Vec::new();
    stream.extend_from_slice(&png_bytes(4, 4, [1, 2, 3]));

    // 第二張影格只寫出前半段
    let partial = png_bytes(4, 4, [4, 5, 6]);
    stream.extend_from_slice(&partial[..partial.len() / 2]);

    let demuxed = FrameDemuxer::new(Cursor::new(stream)).scan().unwrap();
    assert_eq!(demuxed.ranges().len(), 1);

    let decoded = demuxed.decode_frames();
    assert_eq!(decoded.frames.len(), 1);
    assert_eq!(decoded.frames[0].get_pixel(0, 0), &Rgb([1, 2, 3]));
}
