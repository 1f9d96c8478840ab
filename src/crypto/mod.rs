//! Credential codec
//!
//! Short secrets (router username/password) are stored AES-CBC encrypted.
//! Ciphertext format: HEX(IV) || HEX(ciphertext), upper case, IV = 16 bytes.
//! The key is hex encoded too; its length picks AES-128/192/256.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::AppError;

/// IV length in bytes (one AES block)
const IV_LEN: usize = 16;

/// Encrypt `plaintext` under the hex encoded `key` with a fresh random IV
pub fn encrypt(plaintext: &str, key: &str) -> Result<String, AppError> {
    let key = decode_key(key)?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = match key.len() {
        16 => encrypt_with::<Aes128>(&key, &iv, plaintext.as_bytes())?,
        24 => encrypt_with::<Aes192>(&key, &iv, plaintext.as_bytes())?,
        32 => encrypt_with::<Aes256>(&key, &iv, plaintext.as_bytes())?,
        n => return Err(invalid_key_length(n)),
    };

    let mut out = String::with_capacity((IV_LEN + ciphertext.len()) * 2);
    out.push_str(&hex::encode_upper(iv));
    out.push_str(&hex::encode_upper(ciphertext));
    Ok(out)
}

/// Decrypt a value produced by [`encrypt`]
pub fn decrypt(ciphertext: &str, key: &str) -> Result<String, AppError> {
    let key = decode_key(key)?;
    let raw = hex::decode(ciphertext)?;

    if raw.len() < IV_LEN {
        return Err(AppError::Format(format!(
            "ciphertext too short: expected at least {} hex characters for the IV, got {}",
            IV_LEN * 2,
            ciphertext.len()
        )));
    }
    let (iv, body) = raw.split_at(IV_LEN);

    let plaintext = match key.len() {
        16 => decrypt_with::<Aes128>(&key, iv, body)?,
        24 => decrypt_with::<Aes192>(&key, iv, body)?,
        32 => decrypt_with::<Aes256>(&key, iv, body)?,
        n => return Err(invalid_key_length(n)),
    };

    String::from_utf8(plaintext)
        .map_err(|e| AppError::Crypto(format!("decrypted value is not UTF-8: {}", e)))
}

fn encrypt_with<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, AppError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let enc = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| AppError::Crypto(e.to_string()))?;
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn decrypt_with<C>(key: &[u8], iv: &[u8], body: &[u8]) -> Result<Vec<u8>, AppError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let dec = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| AppError::Crypto(e.to_string()))?;
    dec.decrypt_padded_vec_mut::<Pkcs7>(body)
        .map_err(|_| AppError::Crypto("invalid padding or ciphertext length".to_string()))
}

/// A malformed key is a crypto failure, not a ciphertext format one
fn decode_key(key: &str) -> Result<Vec<u8>, AppError> {
    hex::decode(key).map_err(|e| AppError::Crypto(format!("invalid key: {}", e)))
}

fn invalid_key_length(n: usize) -> AppError {
    AppError::Crypto(format!(
        "key must decode to 16, 24 or 32 bytes, got {} bytes",
        n
    ))
}
