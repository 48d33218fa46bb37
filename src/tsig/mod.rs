//! Support for TSIG.
//!
//! This module provides support for signing message exchanges with TSIG as
//! defined in [RFC 8945].
//!
//! TSIG is intended to provide authentication for message exchanges. Messages
//! are signed using a secret key shared between the two participants. The
//! party sending the request – the client – generates a signature over the
//! message it is about to send using that key and adds it in a special record
//! of record type [TSIG] to the additional section of the message. The
//! receiver of the request – the server – verifies the signature using the
//! same key. When creating an answer, it too generates a signature. It
//! includes the request’s signture in this process in order to bind request
//! and answer together.
//!
//! TSIG supports a number of algorithms for signature generation. We only
//! support the SHA-based algorithms from [RFC 4635]. HMAC-MD5 is rejected
//! when creating a key. You can choose the algorithm via the [`Algorithm`]
//! enum.
//!
//! Keys are managed via the [`Key`] type. Each key has a name, which is in
//! fact a domain name, and is tied to one algorithm. A key can sign and
//! verify single messages. Signing happens either right away through
//! [`Key::apply`] or when the message is encoded if the key has been
//! attached via [`Message::set_tsig`]. The latter reserves space for the
//! signature if the message size is limited.
//!
//! Answers consisting of a sequence of messages, such as zone transfers
//! over TCP, only need to carry a signature on every hundredth message and
//! the last one. Each signature covers all messages since the previous
//! one. [`StreamSigner`] and [`StreamVerifier`] deal with these.
//!
//! Every key creates a fresh HMAC context for each operation, so a key can
//! be shared freely between threads.
//!
//! [RFC 4635]: https://tools.ietf.org/html/rfc4635
//! [RFC 8945]: https://tools.ietf.org/html/rfc8945
//! [TSIG]: crate::rdata::Tsig

use crate::base::header::{HeaderSection, Section};
use crate::base::iana::{Class, TsigRcode};
use crate::base::message::{Message, TsigState};
use crate::base::name::{Name, NameError};
use crate::base::record::Record;
use crate::base::wire::ComposeError;
use crate::rdata::{AllRecordData, Time48, Tsig};
use crate::utils::base64;
use bytes::{BufMut, Bytes, BytesMut};
use core::str::FromStr;
use core::{cmp, fmt, mem};
use ring::{constant_time, hmac, rand};
use tracing::{debug, warn};

/// The number of messages in a stream that may follow a signed one.
///
/// Verification fails if this many messages arrive without a signature.
const MAX_UNSIGNED: usize = 100;

//------------ Key -----------------------------------------------------------

/// A key for creating and validating TSIG signatures.
///
/// For the algorithms included in this implementation, keys are octet
/// strings of any size that are converted into the algorithm’s native key
/// length through a well defined method. The type provides means both for
/// creating new random keys via the [`generate`] function and for loading
/// them from the octets via [`new`].
///
/// Keys are identified in TSIG through a name that is encoded as a domain
/// name. While RFC 8945 allows a key to be used with any
/// algorithm, we tie them together, so each `Key` value also knows which
/// algorithm it can be used for.
///
/// Received signatures may be truncated but never to fewer than ten octets
/// or half the algorithm’s native length, whichever is larger. Signatures
/// created with the key are never truncated.
///
/// [`generate`]: #method.generate
/// [`new`]: #method.new
#[derive(Clone, Debug)]
pub struct Key {
    /// The key’s bits and algorithm.
    key: hmac::Key,

    /// The name of the key as a domain name.
    name: Name,

    algorithm: Algorithm,

    /// Seconds of clock skew permitted around the signing time.
    fudge: u16,
}

/// # Creating Keys
///
impl Key {
    /// The default fudge in seconds.
    pub const DEFAULT_FUDGE: u16 = 300;

    /// Creates a new key from its components.
    ///
    /// The name must be absolute and the secret must not be empty.
    pub fn new(
        algorithm: Algorithm,
        secret: &[u8],
        name: Name,
    ) -> Result<Self, NewKeyError> {
        if !name.is_absolute() {
            return Err(NewKeyError::RelativeName);
        }
        if secret.is_empty() {
            return Err(NewKeyError::BadKeyMaterial);
        }
        Ok(Key {
            key: hmac::Key::new(algorithm.into_hmac_algorithm(), secret),
            name,
            algorithm,
            fudge: Self::DEFAULT_FUDGE,
        })
    }

    /// Creates a new key from its textual representation.
    ///
    /// The algorithm is given by its name, e.g., `"hmac-sha256"`, and the
    /// secret is Base 64 encoded as in the usual configuration files.
    pub fn from_base64(
        algorithm: &str,
        name: &str,
        secret: &str,
    ) -> Result<Self, NewKeyError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| NewKeyError::UnsupportedAlgorithm)?;
        let name = Name::from_str(name).map_err(NewKeyError::BadName)?;
        let secret =
            base64::decode_vec(secret).map_err(|_| NewKeyError::BadKeyMaterial)?;
        Self::new(algorithm, &secret, name)
    }

    /// Generates a new signing key.
    ///
    /// This is similar to [`new`] but generates the bits for the key from
    /// the given `rng`. It returns both the key and bits for serialization
    /// and exporting.
    ///
    /// [`new`]: #method.new
    pub fn generate(
        algorithm: Algorithm,
        rng: &dyn rand::SecureRandom,
        name: Name,
    ) -> Result<(Self, Bytes), NewKeyError> {
        let mut bytes = BytesMut::zeroed(algorithm.native_len());
        rng.fill(&mut bytes)
            .map_err(|_| NewKeyError::GenerationFailed)?;
        let key = Self::new(algorithm, &bytes, name)?;
        Ok((key, bytes.freeze()))
    }

    /// Sets the fudge used for signatures created with this key.
    #[must_use]
    pub fn with_fudge(mut self, fudge: u16) -> Self {
        self.fudge = fudge;
        self
    }

    /// Creates a signing context for this key.
    fn signing_context(&self) -> hmac::Context {
        hmac::Context::with_key(&self.key)
    }
}

/// # Access to Properties
///
impl Key {
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns a reference to the name of this key.
    #[must_use]
    pub fn name(&self) -> &Name {
        &self.name
    }

    #[must_use]
    pub fn fudge(&self) -> u16 {
        self.fudge
    }

    /// Returns the native length of the signature from this key.
    #[must_use]
    pub fn native_len(&self) -> usize {
        self.algorithm.native_len()
    }

    /// Returns the minimum acceptable length of a received signature.
    #[must_use]
    pub fn min_mac_len(&self) -> usize {
        cmp::max(10, self.native_len() / 2)
    }

    /// Returns the maximum length of a TSIG record created with this key.
    ///
    /// This is the space a message needs to reserve for the record.
    #[must_use]
    pub fn record_length(&self) -> usize {
        self.name.compose_len()
            + 10 // type, class, TTL, rdlen
            + self.algorithm.wire_name().len()
            + 8 // time signed, fudge
            + 2 + self.native_len() // MAC length and MAC
            + 4 // original ID, error
            + 8 // other length and a 48 bit time
    }

    /// Checks whether the TSIG record was created with this key.
    fn check_key(&self, record: &Record, tsig: &Tsig) -> Result<(), TsigRcode> {
        if *record.owner() != self.name
            || *tsig.algorithm() != self.algorithm.to_name()
        {
            Err(TsigRcode::BadKey)
        } else {
            Ok(())
        }
    }

    /// Compares two signatures.
    ///
    /// The first signature is the expected value, the second the provided
    /// one. The provided signature may be truncated down to the minimum
    /// length.
    fn compare_signatures(
        &self,
        expected: &hmac::Tag,
        provided: &[u8],
    ) -> Result<(), TsigRcode> {
        let expected = expected.as_ref();
        if provided.len() > expected.len() || provided.len() < self.min_mac_len()
        {
            return Err(TsigRcode::BadSig);
        }
        constant_time::verify_slices_are_equal(
            &expected[..provided.len()],
            provided,
        )
        .map_err(|_| TsigRcode::BadSig)
    }

    /// Creates the TSIG record for the variables and MAC.
    fn tsig_record(
        &self,
        variables: &Variables,
        mac: Bytes,
        original_id: u16,
    ) -> Record {
        Record::new(
            self.name.clone(),
            Class::Any,
            0,
            AllRecordData::Tsig(Tsig::new_unchecked(
                self.algorithm.to_name(),
                variables.time_signed,
                variables.fudge,
                mac,
                original_id,
                variables.error,
                variables.other.clone(),
            )),
        )
    }
}

/// # Signing and Verifying
///
impl Key {
    /// Creates the TSIG record for a message.
    ///
    /// The `wire` octets are the complete message without the TSIG record.
    /// The error is placed into the record. The message is only signed if
    /// the error is NOERROR, BADTIME, or BADTRUNC. Otherwise the record
    /// has an empty MAC. For BADTIME, the signing time is taken from
    /// `previous` and the current time goes into the other data.
    ///
    /// If `previous` is given, its MAC is included first. If `full` is
    /// `false`, only the time signed and fudge are included instead of
    /// all the TSIG variables, as is done for all but the first message
    /// of a stream.
    #[must_use]
    pub fn generate_record(
        &self,
        wire: &[u8],
        error: TsigRcode,
        previous: Option<&Tsig>,
        full: bool,
    ) -> Record {
        let now = Time48::now();
        let time_signed = match previous {
            Some(previous) if error == TsigRcode::BadTime => {
                previous.time_signed()
            }
            _ => now,
        };
        let other = if error == TsigRcode::BadTime {
            Bytes::copy_from_slice(&now.into_octets())
        } else {
            Bytes::new()
        };
        let variables = Variables::new(time_signed, self.fudge, error, other);
        let signing = error == TsigRcode::NoError
            || error == TsigRcode::BadTime
            || error == TsigRcode::BadTrunc;
        let mac = if signing {
            let mut context = self.signing_context();
            if let Some(previous) = previous {
                update_mac(&mut context, previous.mac());
            }
            context.update(wire);
            if full {
                variables.sign(self, &mut context);
            } else {
                variables.sign_timers(&mut context);
            }
            Bytes::copy_from_slice(context.sign().as_ref())
        } else {
            Bytes::new()
        };
        self.tsig_record(&variables, mac, message_id(wire))
    }

    /// Signs a message by adding a TSIG record.
    ///
    /// The message is encoded with compression and the record created over
    /// the result. Encoding the message again will produce the same octets
    /// followed by the TSIG record.
    pub fn apply(
        &self,
        msg: &mut Message,
        error: TsigRcode,
        previous: Option<&Tsig>,
    ) -> Result<(), ComposeError> {
        let wire = msg.to_wire()?;
        let record = self.generate_record(&wire, error, previous, true);
        msg.add_record(Section::Additional, record);
        msg.set_tsig_state(TsigState::Signed);
        Ok(())
    }

    /// Verifies the TSIG record of a received message.
    ///
    /// For a response, `previous` is the TSIG record of the request. It is
    /// included in the signature unless its error was BADKEY or BADSIG.
    ///
    /// Returns the TSIG error for the message. The message’s TSIG state is
    /// updated to reflect the outcome.
    pub fn verify(
        &self,
        msg: &mut Message,
        previous: Option<&Tsig>,
    ) -> TsigRcode {
        let res = self.check_message(msg, previous);
        finish_verify(msg, res)
    }

    fn check_message(
        &self,
        msg: &Message,
        previous: Option<&Tsig>,
    ) -> Result<(), TsigRcode> {
        let (record, tsig) = match (msg.tsig_record(), msg.tsig()) {
            (Some(record), Some(tsig)) => (record, tsig),
            _ => return Err(TsigRcode::FormErr),
        };
        let (wire, start) = match (msg.as_wire(), msg.tsig_start()) {
            (Some(wire), Some(start)) => (wire, start),
            _ => return Err(TsigRcode::FormErr),
        };
        self.check_key(record, tsig)?;

        let mut context = self.signing_context();
        if let Some(previous) = previous {
            if previous.error() != TsigRcode::BadKey
                && previous.error() != TsigRcode::BadSig
            {
                update_mac(&mut context, previous.mac());
            }
        }
        update_message(
            &mut context,
            wire,
            start,
            Some(tsig.original_id()),
            true,
        );
        Variables::from_tsig(tsig).sign_record(record, &mut context);
        self.compare_signatures(&context.sign(), tsig.mac())?;
        if !tsig.is_valid_now() {
            return Err(TsigRcode::BadTime);
        }
        Ok(())
    }
}

//------------ TsigSigner ----------------------------------------------------

/// A key attached to a message for signing when it is encoded.
#[derive(Clone, Debug)]
pub struct TsigSigner {
    key: Key,
    error: TsigRcode,
    previous: Option<Tsig>,
}

impl TsigSigner {
    pub(crate) fn new(key: Key, error: TsigRcode, previous: Option<Tsig>) -> Self {
        TsigSigner {
            key,
            error,
            previous,
        }
    }

    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    #[must_use]
    pub fn error(&self) -> TsigRcode {
        self.error
    }

    /// Creates the TSIG record over the encoded message.
    #[must_use]
    pub fn sign(&self, wire: &[u8]) -> Record {
        self.key
            .generate_record(wire, self.error, self.previous.as_ref(), true)
    }
}

//------------ StreamSigner --------------------------------------------------

/// Signs the messages of a multi-message response.
///
/// The first and the last message are always signed. In between, every
/// `interval`-th message is signed. Each signature covers all unsigned
/// messages since the previous signature.
#[derive(Clone, Debug)]
pub struct StreamSigner {
    key: Key,

    /// The TSIG record of the request.
    request: Option<Tsig>,

    /// The running MAC since the last signature.
    context: Option<hmac::Context>,

    count: usize,
    interval: usize,
}

impl StreamSigner {
    /// Creates a new signer for the answer to a request.
    #[must_use]
    pub fn new(key: Key, request: Option<Tsig>) -> Self {
        StreamSigner {
            key,
            request,
            context: None,
            count: 0,
            interval: MAX_UNSIGNED,
        }
    }

    /// Sets how often messages are signed.
    ///
    /// The value is limited to between 1 and 100.
    #[must_use]
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval.clamp(1, MAX_UNSIGNED);
        self
    }

    /// Returns the number of messages produced so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Encodes the next message and signs it if necessary.
    ///
    /// Set `last` for the final message of the stream.
    pub fn next(
        &mut self,
        msg: &Message,
        last: bool,
    ) -> Result<Bytes, ComposeError> {
        let wire = msg.to_wire()?;
        self.count += 1;
        let sign = self.count == 1 || last || self.count % self.interval == 0;
        let record = if self.count == 1 {
            self.key.generate_record(
                &wire,
                TsigRcode::NoError,
                self.request.as_ref(),
                true,
            )
        } else {
            let context = self
                .context
                .get_or_insert_with(|| self.key.signing_context());
            context.update(&wire);
            if !sign {
                return Ok(wire);
            }
            let variables = Variables::new(
                Time48::now(),
                self.key.fudge,
                TsigRcode::NoError,
                Bytes::new(),
            );
            variables.sign_timers(context);
            let mac = match self.context.take() {
                Some(context) => Bytes::copy_from_slice(context.sign().as_ref()),
                None => Bytes::new(),
            };
            self.key.tsig_record(&variables, mac, message_id(&wire))
        };
        if let AllRecordData::Tsig(ref tsig) = *record.data() {
            let mut context = self.key.signing_context();
            update_mac(&mut context, tsig.mac());
            self.context = Some(context);
        }
        append_record(&wire, &record)
    }
}

//------------ StreamVerifier ------------------------------------------------

/// Verifies the messages of a multi-message response.
///
/// The first message must be signed and so must be the last one which is
/// checked by [`finish`]. Messages in between may be unsigned as long as
/// no more than 99 messages in a row lack a signature.
///
/// [`finish`]: #method.finish
#[derive(Clone, Debug)]
pub struct StreamVerifier {
    key: Key,

    /// The TSIG record of the request.
    request: Option<Tsig>,

    /// The running MAC since the last signature.
    context: hmac::Context,

    responses: usize,
    last_signed: usize,
    last_was_signed: bool,
}

impl StreamVerifier {
    /// Creates a verifier for the answer to a request.
    #[must_use]
    pub fn new(key: Key, request: Option<Tsig>) -> Self {
        let context = key.signing_context();
        StreamVerifier {
            key,
            request,
            context,
            responses: 0,
            last_signed: 0,
            last_was_signed: false,
        }
    }

    /// Returns the number of messages seen so far.
    #[must_use]
    pub fn responses(&self) -> usize {
        self.responses
    }

    /// Verifies the next message of the stream.
    ///
    /// Returns NOERROR if the message was either verified or may be
    /// unsigned. The message’s TSIG state tells the two apart.
    pub fn verify(&mut self, msg: &mut Message) -> TsigRcode {
        self.responses += 1;
        if self.responses == 1 {
            let res = self.key.check_message(msg, self.request.as_ref());
            self.last_was_signed = msg.tsig().is_some();
            if res.is_ok() {
                if let Some(tsig) = msg.tsig() {
                    self.restart(tsig.mac());
                }
            }
            return finish_verify(msg, res);
        }
        let res = self.verify_subsequent(msg);
        match res {
            Ok(true) => finish_verify(msg, Ok(())),
            Ok(false) => {
                msg.set_tsig_state(TsigState::Intermediate);
                TsigRcode::NoError
            }
            Err(err) => finish_verify(msg, Err(err)),
        }
    }

    /// Checks a later message.
    ///
    /// Returns whether the message was signed.
    fn verify_subsequent(&mut self, msg: &Message) -> Result<bool, TsigRcode> {
        let wire = msg.as_wire().ok_or(TsigRcode::FormErr)?;
        let signed = match (msg.tsig_record(), msg.tsig(), msg.tsig_start()) {
            (Some(record), Some(tsig), Some(start)) => {
                Some((record, tsig, start))
            }
            _ => None,
        };
        let end = signed.map_or(wire.len(), |(_, _, start)| start);
        update_message(&mut self.context, wire, end, None, signed.is_some());

        let (record, tsig) = match signed {
            Some((record, tsig, _)) => (record, tsig),
            None => {
                self.last_was_signed = false;
                if self.responses - self.last_signed >= MAX_UNSIGNED {
                    warn!(
                        responses = self.responses,
                        last_signed = self.last_signed,
                        "too many unsigned messages in TSIG stream"
                    );
                    return Err(TsigRcode::FormErr);
                }
                return Ok(false);
            }
        };
        self.last_signed = self.responses;
        self.last_was_signed = true;
        self.key.check_key(record, tsig)?;
        Variables::from_tsig(tsig).sign_timers(&mut self.context);
        let context =
            mem::replace(&mut self.context, self.key.signing_context());
        self.key.compare_signatures(&context.sign(), tsig.mac())?;
        if !tsig.is_valid_now() {
            return Err(TsigRcode::BadTime);
        }
        self.restart(tsig.mac());
        Ok(true)
    }

    /// Checks that the stream ended with a signed message.
    #[must_use]
    pub fn finish(&self) -> TsigRcode {
        if self.responses == 0 || !self.last_was_signed {
            debug!(
                responses = self.responses,
                "TSIG stream did not end in a signed message"
            );
            TsigRcode::FormErr
        } else {
            TsigRcode::NoError
        }
    }

    /// Starts a new running MAC with the given signature.
    fn restart(&mut self, mac: &[u8]) {
        let mut context = self.key.signing_context();
        update_mac(&mut context, mac);
        self.context = context;
    }
}

//------------ Variables -----------------------------------------------------

/// The TSIG Variables.
///
/// These are the values from the TSIG record that are included in the
/// signature besides the message itself.
#[derive(Clone, Debug)]
struct Variables {
    /// The time the signature was created.
    time_signed: Time48,

    /// The number of seconds of clock skew permitted.
    fudge: u16,

    /// The TSIG error code.
    error: TsigRcode,

    /// The content of the ‘other’ field.
    other: Bytes,
}

impl Variables {
    /// Creates a new value from the parts.
    fn new(time_signed: Time48, fudge: u16, error: TsigRcode, other: Bytes) -> Self {
        Variables {
            time_signed,
            fudge,
            error,
            other,
        }
    }

    /// Takes the variables from received TSIG record data.
    fn from_tsig(tsig: &Tsig) -> Self {
        Self::new(
            tsig.time_signed(),
            tsig.fudge(),
            tsig.error(),
            tsig.other().clone(),
        )
    }

    /// Applies the full variables for a record created with `key`.
    fn sign(&self, key: &Key, context: &mut hmac::Context) {
        self.sign_full(&key.name, Class::Any, 0, key.algorithm.wire_name(), context)
    }

    /// Applies the full variables using the values of a received record.
    fn sign_record(&self, record: &Record, context: &mut hmac::Context) {
        let algorithm = match *record.data() {
            AllRecordData::Tsig(ref tsig) => tsig.algorithm().to_canonical(),
            _ => Name::root(),
        };
        self.sign_full(
            record.owner(),
            record.class(),
            record.ttl(),
            algorithm.as_slice(),
            context,
        )
    }

    fn sign_full(
        &self,
        name: &Name,
        class: Class,
        ttl: u32,
        algorithm: &[u8],
        context: &mut hmac::Context,
    ) {
        let mut buf = BytesMut::with_capacity(128);
        // Key name, in canonical wire format
        name.compose_canonical(&mut buf);
        // CLASS (always ANY)
        buf.put_u16(class.to_int());
        // TTL (always 0)
        buf.put_u32(ttl);
        // Algorithm Name (in canonical wire format)
        buf.extend(algorithm.iter().map(u8::to_ascii_lowercase));
        buf.put_slice(&self.time_signed.into_octets());
        buf.put_u16(self.fudge);
        buf.put_u16(self.error.to_int());
        buf.put_u16(self.other.len() as u16);
        buf.put_slice(&self.other);
        context.update(&buf);
    }

    /// Applies only the timing values to the signing context.
    fn sign_timers(&self, context: &mut hmac::Context) {
        context.update(&self.time_signed.into_octets());
        context.update(&self.fudge.to_be_bytes());
    }
}

//------------ Algorithm -----------------------------------------------------

/// The supported TSIG algorithms.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    /// Creates a value from its domain name representation.
    ///
    /// Returns `None` if the name doesn’t represent a supported algorithm.
    #[must_use]
    pub fn from_name(name: &Name) -> Option<Self> {
        [
            Algorithm::Sha1,
            Algorithm::Sha256,
            Algorithm::Sha384,
            Algorithm::Sha512,
        ]
        .into_iter()
        .find(|alg| alg.wire_name().eq_ignore_ascii_case(name.as_slice()))
    }

    /// Returns the ring HMAC algorithm for this TSIG algorithm.
    fn into_hmac_algorithm(self) -> hmac::Algorithm {
        match self {
            Algorithm::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            Algorithm::Sha256 => hmac::HMAC_SHA256,
            Algorithm::Sha384 => hmac::HMAC_SHA384,
            Algorithm::Sha512 => hmac::HMAC_SHA512,
        }
    }

    /// Returns the wire-format domain name for this value.
    fn wire_name(self) -> &'static [u8] {
        match self {
            Algorithm::Sha1 => b"\x09hmac-sha1\0",
            Algorithm::Sha256 => b"\x0Bhmac-sha256\0",
            Algorithm::Sha384 => b"\x0Bhmac-sha384\0",
            Algorithm::Sha512 => b"\x0Bhmac-sha512\0",
        }
    }

    /// Returns a domain name for this value.
    #[must_use]
    pub fn to_name(self) -> Name {
        Name::from_static_wire(self.wire_name())
    }

    /// Returns the native length of a signature created with this algorithm.
    #[must_use]
    pub fn native_len(self) -> usize {
        self.into_hmac_algorithm().digest_algorithm().output_len()
    }
}

//--- FromStr

impl FromStr for Algorithm {
    type Err = NewKeyError;

    /// Converts the name of an algorithm.
    ///
    /// A trailing dot is accepted, case is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_suffix('.').unwrap_or(s).to_ascii_lowercase();
        match s.as_str() {
            "hmac-sha1" => Ok(Algorithm::Sha1),
            "hmac-sha256" => Ok(Algorithm::Sha256),
            "hmac-sha384" => Ok(Algorithm::Sha384),
            "hmac-sha512" => Ok(Algorithm::Sha512),
            _ => Err(NewKeyError::UnsupportedAlgorithm),
        }
    }
}

//--- Display

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Algorithm::Sha1 => "hmac-sha1",
            Algorithm::Sha256 => "hmac-sha256",
            Algorithm::Sha384 => "hmac-sha384",
            Algorithm::Sha512 => "hmac-sha512",
        })
    }
}

//------------ Helper Functions ----------------------------------------------

/// Includes a previous MAC in a signature.
fn update_mac(context: &mut hmac::Context, mac: &[u8]) {
    context.update(&(mac.len() as u16).to_be_bytes());
    context.update(mac);
}

/// Includes a received message up to `end` in a signature.
///
/// If `original_id` is given, it replaces the message ID. If `remove_tsig`
/// is set, the additional count is reduced by one to exclude the TSIG
/// record.
fn update_message(
    context: &mut hmac::Context,
    wire: &[u8],
    end: usize,
    original_id: Option<u16>,
    remove_tsig: bool,
) {
    let mut header = [0u8; HeaderSection::LEN];
    header.copy_from_slice(&wire[..HeaderSection::LEN]);
    if let Some(id) = original_id {
        header[..2].copy_from_slice(&id.to_be_bytes());
    }
    if remove_tsig {
        let arcount = u16::from_be_bytes([header[10], header[11]]);
        header[10..].copy_from_slice(&arcount.saturating_sub(1).to_be_bytes());
    }
    context.update(&header);
    context.update(&wire[HeaderSection::LEN..end]);
}

/// Returns the message ID of an encoded message.
fn message_id(wire: &[u8]) -> u16 {
    match wire {
        [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
        _ => 0,
    }
}

/// Appends a record to an encoded message and bumps the additional count.
fn append_record(wire: &[u8], record: &Record) -> Result<Bytes, ComposeError> {
    let mut res = BytesMut::from(wire);
    record.compose(&mut res, None)?;
    let arcount = u16::from_be_bytes([res[10], res[11]]).wrapping_add(1);
    res[10..12].copy_from_slice(&arcount.to_be_bytes());
    Ok(res.freeze())
}

/// Updates the message state after verification and logs failures.
fn finish_verify(msg: &mut Message, res: Result<(), TsigRcode>) -> TsigRcode {
    match res {
        Ok(()) => {
            msg.set_tsig_state(TsigState::Verified);
            TsigRcode::NoError
        }
        Err(err) => {
            debug!(id = msg.header().id(), error = %err, "TSIG verification failed");
            msg.set_tsig_state(TsigState::Failed);
            err
        }
    }
}

//============ Error Types ===================================================

//------------ NewKeyError ---------------------------------------------------

/// A key couldn’t be created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NewKeyError {
    /// The algorithm is unknown or not supported.
    UnsupportedAlgorithm,

    /// The secret is empty or not properly encoded.
    BadKeyMaterial,

    /// The key name is not absolute.
    RelativeName,

    /// The key name could not be converted.
    BadName(NameError),

    /// The random number generator failed.
    GenerationFailed,
}

//--- Display and Error

impl fmt::Display for NewKeyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NewKeyError::UnsupportedAlgorithm => {
                f.write_str("unsupported algorithm")
            }
            NewKeyError::BadKeyMaterial => f.write_str("bad key material"),
            NewKeyError::RelativeName => f.write_str("relative key name"),
            NewKeyError::BadName(ref err) => {
                write!(f, "bad key name: {}", err)
            }
            NewKeyError::GenerationFailed => {
                f.write_str("generating key failed")
            }
        }
    }
}

impl std::error::Error for NewKeyError {}

//============ Testing =======================================================
