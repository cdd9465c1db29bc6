#![feature(allocator_api)]

use log::info;
use simd_align::{aligned_vec, default_align, AlignedAllocator, AlignedVec, SimdType, SIMD_TYPE};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn low_bits(ptr: *const f32, bits: u32) -> usize {
    (ptr as usize) & ((1 << bits) - 1)
}

#[test]
fn vector_of_32_floats_is_aligned() {
    init_logger();
    info!("SIMD type: {SIMD_TYPE}");
    info!("test alignment: {}", default_align());

    let v = AlignedVec::<f32>::with_len(32);
    match SIMD_TYPE {
        SimdType::Avx => assert_eq!(low_bits(v.as_ptr(), 5), 0),
        SimdType::Sse => assert_eq!(low_bits(v.as_ptr(), 4), 0),
        SimdType::None => assert_eq!(v.as_ptr() as usize % align_of::<f32>(), 0),
    }
    assert_eq!(v.as_ptr() as usize % default_align(), 0);
}

#[test]
#[cfg(target_feature = "avx")]
fn avx_build_selects_32() {
    assert_eq!(default_align(), 32);
}

#[test]
#[cfg(all(target_feature = "sse", not(target_feature = "avx")))]
fn sse_build_selects_16() {
    assert_eq!(default_align(), 16);
}

#[test]
#[cfg(not(any(target_feature = "sse", target_feature = "avx")))]
fn plain_build_selects_1() {
    assert_eq!(default_align(), 1);
}

#[test]
fn allocators_are_interchangeable() {
    let floats = AlignedAllocator::<f32>::new();
    let bytes = AlignedAllocator::<u8>::new();
    assert!(floats == bytes);
    assert!(!(floats != bytes));

    let v: AlignedVec<f32> = aligned_vec![1.5; 8];
    let alloc = *v.allocator();
    assert!(alloc == bytes);
}

#[test]
fn buffers_stay_aligned_across_threads() {
    init_logger();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            std::thread::spawn(move || {
                let mut v = AlignedVec::<f64>::new();
                for i in 0..500 {
                    v.push((t * i) as f64);
                    assert!(v.is_aligned());
                }
                v.len()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 500);
    }
}
