//! Matrix-vector products in both packing styles

use approx::assert_relative_eq;
use cryptarray_core::{
    ops, CryptoContext, EncodingOrder, Error, MatVecStyle, PackMode, PackOptions, UnpackForm,
};

type Result<T> = cryptarray_core::Result<T>;

fn assert_close(got: &[f64], want: &[f64]) {
    assert_eq!(got.len(), want.len());
    for (g, w) in got.iter().zip(want.iter()) {
        assert_relative_eq!(g, w, epsilon = 1e-8);
    }
}

/// Row-major tiled matrix times col-major tiled vector, reduced with the
/// matrix's colkey over ncols = 4.
#[test]
fn test_crc_product() -> Result<()> {
    let mut ctx = CryptoContext::with_clear_backend(32)?;
    let pair = ctx.key_gen()?;
    #[rustfmt::skip]
    let a_vals = [
        1.0, 2.0, 3.0, 4.0,
        5.0, 6.0, 7.0, 8.0,
        9.0, 8.0, 7.0, 6.0,
        5.0, 4.0, 3.0, 2.0,
    ];
    let v_vals = [1.0, 0.5, -1.0, 2.0];

    let matrix_opts = PackOptions::default().mode(PackMode::TileReplicate);
    let mut matrix = ctx.encrypt_matrix(pair.public, &a_vals, 4, 4, matrix_opts)?;
    let vector_opts = PackOptions::with_order(EncodingOrder::ColMajor)
        .mode(PackMode::TileReplicate)
        .target_block(4);
    let vector = ctx.encrypt_vector(pair.public, &v_vals, vector_opts)?;

    ctx.gen_matvec_key(pair.secret, &mut matrix, MatVecStyle::Crc)?;
    let product = ops::matvec(&mut ctx, &matrix, &vector)?;
    assert_eq!(product.order(), EncodingOrder::RowMajor);
    // The result is a zero-pad handle; it must not inherit the tiled
    // operand's replication count.
    assert_eq!(product.mode(), PackMode::ZeroPad);
    assert_eq!(product.layout().replication_count, 1);

    let got = product.decrypt(&ctx, pair.secret, UnpackForm::OriginalShape)?;
    // Plain dot products of each row with v.
    assert_close(&got, &[7.0, 17.0, 18.0, 8.0]);
    Ok(())
}

/// Col-major matrix times row-major vector packed with target_cols equal to
/// the matrix's row count; reduced with the strided rowkey.
#[test]
fn test_rcr_product() -> Result<()> {
    let mut ctx = CryptoContext::with_clear_backend(32)?;
    let pair = ctx.key_gen()?;
    #[rustfmt::skip]
    let a_vals = [
        2.0, 0.0, 1.0,
        1.0, 3.0, 2.0,
        0.0, 1.0, 4.0,
    ];
    let v_vals = [1.0, 2.0, 3.0];

    let matrix_opts = PackOptions::with_order(EncodingOrder::ColMajor);
    let mut matrix = ctx.encrypt_matrix(pair.public, &a_vals, 3, 3, matrix_opts)?;
    // target_cols: pad the vector's rows out to the matrix's 4-row block.
    let vector_opts = PackOptions::with_order(EncodingOrder::RowMajor).target_block(4);
    let vector = ctx.encrypt_vector(pair.public, &v_vals, vector_opts)?;

    ctx.gen_matvec_key(pair.secret, &mut matrix, MatVecStyle::Rcr)?;
    let product = ops::matvec(&mut ctx, &matrix, &vector)?;
    assert_eq!(product.order(), EncodingOrder::ColMajor);

    let got = product.decrypt(&ctx, pair.secret, UnpackForm::OriginalShape)?;
    assert_close(&got, &[5.0, 13.0, 14.0]);
    Ok(())
}

#[test]
fn test_matvec_rejects_matching_orders() -> Result<()> {
    let mut ctx = CryptoContext::with_clear_backend(32)?;
    let pair = ctx.key_gen()?;
    let matrix = ctx.encrypt_matrix(pair.public, &[0.0; 16], 4, 4, PackOptions::default())?;
    let vector = ctx.encrypt_vector(
        pair.public,
        &[0.0; 4],
        PackOptions::default().target_block(4),
    )?;
    assert!(matches!(
        ops::matvec(&mut ctx, &matrix, &vector),
        Err(Error::OrderMismatch(_))
    ));
    Ok(())
}

#[test]
fn test_crc_needs_tiled_vector() -> Result<()> {
    let mut ctx = CryptoContext::with_clear_backend(32)?;
    let pair = ctx.key_gen()?;
    let mut matrix = ctx.encrypt_matrix(pair.public, &[0.0; 16], 4, 4, PackOptions::default())?;
    ctx.gen_matvec_key(pair.secret, &mut matrix, MatVecStyle::Crc)?;
    let vector = ctx.encrypt_vector(
        pair.public,
        &[0.0; 4],
        PackOptions::with_order(EncodingOrder::ColMajor).target_block(4),
    )?;
    assert!(matches!(
        ops::matvec(&mut ctx, &matrix, &vector),
        Err(Error::Configuration(_))
    ));
    Ok(())
}

#[test]
fn test_block_size_disagreement_rejected() -> Result<()> {
    let mut ctx = CryptoContext::with_clear_backend(64)?;
    let pair = ctx.key_gen()?;
    let matrix = ctx.encrypt_matrix(pair.public, &[0.0; 16], 4, 4, PackOptions::default())?;
    // Vector padded to an 8-slot row; the matrix block is 4.
    let vector = ctx.encrypt_vector(
        pair.public,
        &[0.0; 4],
        PackOptions::with_order(EncodingOrder::ColMajor)
            .mode(PackMode::TileReplicate)
            .target_block(8),
    )?;
    assert!(matches!(
        ops::matvec(&mut ctx, &matrix, &vector),
        Err(Error::ShapeMismatch(_))
    ));
    Ok(())
}

#[test]
fn test_matvec_without_key_fails_closed() -> Result<()> {
    let mut ctx = CryptoContext::with_clear_backend(32)?;
    let pair = ctx.key_gen()?;
    let matrix = ctx.encrypt_matrix(
        pair.public,
        &[0.0; 16],
        4,
        4,
        PackOptions::default().mode(PackMode::TileReplicate),
    )?;
    let vector = ctx.encrypt_vector(
        pair.public,
        &[0.0; 4],
        PackOptions::with_order(EncodingOrder::ColMajor)
            .mode(PackMode::TileReplicate)
            .target_block(4),
    )?;
    let err = ops::matvec(&mut ctx, &matrix, &vector).unwrap_err();
    match err {
        Error::MissingKey { hint, .. } => assert!(hint.contains("gen_col_sum_key")),
        other => panic!("expected MissingKey, got {other}"),
    }
    Ok(())
}
